//! Output formatter dispatch
//!
//! Each output kind is a pure function from a raw catalog record to the
//! parts-list shape clients render, plus the set of fields it requires.
//! A record that is empty or lacks a required field formats to `[]`, and so
//! does any output type without a formatter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::calculator::Record;

/// Link value the catalog uses for "no purchase link"
pub const LINK_PLACEHOLDER: &str = "-";

/// Drill name the catalog uses for "no drill in this slot"
pub const NO_DRILL_SEQUENCE: &str = "No Drill Sequence";

pub mod labels {
    pub const IMPLANT_DRILL_KIT: &str = "Implant Drill Kit";
    pub const DRILL_SEQUENCE: &str = "Drill Sequence";
    pub const BUR_KIT: &str = "Bur Kit";
    pub const SURGICAL_BUR_KIT: &str = "Surgical Bur Kit";
    pub const IMPLANT_DRIVER: &str = "Implant Driver";
    pub const LUTING_AGENT: &str = "Luting Agent";
    pub const TEFLON_TAPE: &str = "Teflon Tape";
    pub const MATERIAL_CLOSE_ACCESS_HOLE: &str = "Material to Close Screw Access Hole";
    pub const IMPLANT: &str = "Implant";
    pub const SCANBODY: &str = "Scanbody";
    pub const HEALING_ABUTMENT: &str = "Healing Abutment";
    pub const IMPLANT_ANALOG: &str = "Implant Analog";
    pub const IMPLANT_SCREW: &str = "Implant Screw";
    pub const MULTI_UNIT_ABUTMENT: &str = "Multi-Unit Abutment";
    pub const DIRECT_TO_IMPLANT: &str = "Direct to Implant Restoration";
}

/// One purchasable part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub item_name: String,
    pub item_number: Value,
    pub link: String,
    pub quantity: Option<u8>,
    /// Descriptive metadata some output kinds carry verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutputItem {
    fn new(item_name: String, item_number: Value, link: String) -> Self {
        let quantity = quantity_for(&link);
        Self {
            item_name,
            item_number,
            link,
            quantity,
            extra: Map::new(),
        }
    }
}

/// A labelled group of parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputGroup {
    pub label: String,
    pub info: Vec<OutputItem>,
}

impl OutputGroup {
    fn single(label: &str, item: OutputItem) -> Self {
        Self {
            label: label.to_string(),
            info: vec![item],
        }
    }
}

pub type FormattedOutput = Vec<OutputGroup>;

/// `1` when a real purchase link is present, otherwise `None`
pub fn quantity_for(link: &str) -> Option<u8> {
    let link = link.trim();
    (!link.is_empty() && link != LINK_PLACEHOLDER).then_some(1)
}

/// Output types with a formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    DrillKitAndSequence,
    BoneReduction,
    MasterImplantDriver,
    ChairSidePickUp,
    ImplantPurchase,
    Scanbodies,
    HealingAbutments,
    ImplantAnalogs,
    ImplantScrews,
    RestorativeMultiUnitAbutments,
    RestroativeDirectToImplant,
}

impl OutputKind {
    pub fn all() -> &'static [OutputKind] {
        &[
            OutputKind::DrillKitAndSequence,
            OutputKind::BoneReduction,
            OutputKind::MasterImplantDriver,
            OutputKind::ChairSidePickUp,
            OutputKind::ImplantPurchase,
            OutputKind::Scanbodies,
            OutputKind::HealingAbutments,
            OutputKind::ImplantAnalogs,
            OutputKind::ImplantScrews,
            OutputKind::RestorativeMultiUnitAbutments,
            OutputKind::RestroativeDirectToImplant,
        ]
    }

    /// Calculator-type tag this kind formats
    pub fn tag(&self) -> &'static str {
        match self {
            OutputKind::DrillKitAndSequence => "DrillKitAndSequence",
            OutputKind::BoneReduction => "BoneReduction",
            OutputKind::MasterImplantDriver => "MasterImplantDriver",
            OutputKind::ChairSidePickUp => "ChairSidePickUp",
            OutputKind::ImplantPurchase => "ImplantPurchase",
            OutputKind::Scanbodies => "Scanbodies",
            OutputKind::HealingAbutments => "HealingAbutments",
            OutputKind::ImplantAnalogs => "ImplantAnalogs",
            OutputKind::ImplantScrews => "ImplantScrews",
            OutputKind::RestorativeMultiUnitAbutments => "RestorativeMultiUnitAbutments",
            OutputKind::RestroativeDirectToImplant => "RestroativeDirectToImplant",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.tag() == tag)
    }

    /// Fields that must all be non-empty before any group is emitted
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            OutputKind::BoneReduction => {
                &["Bur Kit Name (Bone Reduction)", "Bur Kit (Denture Conversion) Name"]
            }
            OutputKind::ImplantPurchase
            | OutputKind::HealingAbutments
            | OutputKind::ImplantAnalogs
            | OutputKind::ImplantScrews
            | OutputKind::RestorativeMultiUnitAbutments
            | OutputKind::RestroativeDirectToImplant => {
                &["Item Name", "Link to Purchase", "Item Number"]
            }
            OutputKind::DrillKitAndSequence
            | OutputKind::MasterImplantDriver
            | OutputKind::ChairSidePickUp
            | OutputKind::Scanbodies => &[],
        }
    }

    /// Whether the record is complete enough to format
    pub fn accepts(&self, record: &Record) -> bool {
        !record.is_empty()
            && self
                .required_fields()
                .iter()
                .all(|field| !text(record, field).is_empty())
    }

    pub fn format(&self, record: &Record) -> FormattedOutput {
        if !self.accepts(record) {
            return Vec::new();
        }

        match self {
            OutputKind::DrillKitAndSequence => drill_kit_and_sequence(record),
            OutputKind::BoneReduction => bone_reduction(record),
            OutputKind::MasterImplantDriver => {
                vec![catalog_item(record, labels::IMPLANT_DRIVER)]
            }
            OutputKind::ChairSidePickUp => chair_side_pick_up(record),
            OutputKind::ImplantPurchase => vec![catalog_item(record, labels::IMPLANT)],
            OutputKind::Scanbodies => scanbodies(record),
            OutputKind::HealingAbutments => vec![catalog_item(record, labels::HEALING_ABUTMENT)],
            OutputKind::ImplantAnalogs => vec![catalog_item(record, labels::IMPLANT_ANALOG)],
            OutputKind::ImplantScrews => vec![catalog_item(record, labels::IMPLANT_SCREW)],
            OutputKind::RestorativeMultiUnitAbutments => {
                vec![catalog_item(record, labels::MULTI_UNIT_ABUTMENT)]
            }
            OutputKind::RestroativeDirectToImplant => {
                vec![catalog_item(record, labels::DIRECT_TO_IMPLANT)]
            }
        }
    }
}

/// Trimmed text of a field; numbers are rendered, anything else is empty
fn text(record: &Record, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Item number in its native representation, strings trimmed
fn item_number(record: &Record, field: &str) -> Value {
    match record.get(field) {
        Some(Value::String(s)) => Value::String(s.trim().to_string()),
        Some(v @ Value::Number(_)) => v.clone(),
        _ => Value::String(String::new()),
    }
}

/// The common `Item Name` / `Item Number` / `Link to Purchase` shape
fn catalog_item(record: &Record, label: &str) -> OutputGroup {
    OutputGroup::single(
        label,
        OutputItem::new(
            text(record, "Item Name"),
            item_number(record, "Item Number"),
            text(record, "Link to Purchase"),
        ),
    )
}

fn drill_kit_and_sequence(record: &Record) -> FormattedOutput {
    let kit = OutputItem::new(
        text(record, "Drill Kit Name"),
        item_number(record, "Drill Kit Item Number"),
        text(record, "Drill Kit Link to Purchase"),
    );

    let mut drills = Vec::new();
    for i in 1.. {
        let name_key = format!("Drill {} Name", i);
        if !record.contains_key(&name_key) {
            break;
        }
        let name = text(record, &name_key);
        if name.is_empty() || name == NO_DRILL_SEQUENCE {
            continue;
        }
        drills.push(OutputItem::new(
            name,
            item_number(record, &format!("Drill {} Item Number", i)),
            text(record, &format!("Drill {} Link to Purchase", i)),
        ));
    }

    vec![
        OutputGroup::single(labels::IMPLANT_DRILL_KIT, kit),
        OutputGroup {
            label: labels::DRILL_SEQUENCE.to_string(),
            info: drills,
        },
    ]
}

fn bone_reduction(record: &Record) -> FormattedOutput {
    vec![
        OutputGroup::single(
            labels::BUR_KIT,
            OutputItem::new(
                text(record, "Bur Kit Name (Bone Reduction)"),
                item_number(record, "Item Code"),
                text(record, "Link to Purchase"),
            ),
        ),
        OutputGroup::single(
            labels::SURGICAL_BUR_KIT,
            OutputItem::new(
                text(record, "Bur Kit (Denture Conversion) Name"),
                Value::Null,
                text(record, "Bur Link to Purchase"),
            ),
        ),
    ]
}

fn chair_side_pick_up(record: &Record) -> FormattedOutput {
    let groups = [
        (labels::LUTING_AGENT, "Luting Agent Name", "Luting Agent Link to Purchase"),
        (labels::TEFLON_TAPE, "Teflon Tape", "Teflon Tape Link to Purchase"),
        (
            labels::MATERIAL_CLOSE_ACCESS_HOLE,
            "Material to close screw access hole Name",
            "Material to close screw access hole link to purchase",
        ),
    ];

    groups
        .iter()
        .filter_map(|(label, name_field, link_field)| {
            let name = text(record, name_field);
            (!name.is_empty()).then(|| {
                OutputGroup::single(
                    label,
                    OutputItem::new(
                        name,
                        Value::String(String::new()),
                        text(record, link_field),
                    ),
                )
            })
        })
        .collect()
}

fn scanbodies(record: &Record) -> FormattedOutput {
    let mut item = OutputItem::new(
        text(record, "Item Name"),
        item_number(record, "Scanbody Item Number"),
        text(record, "Link to Purchase"),
    );

    // (output key, record field)
    let extras = [
        ("Manufacturer", "Manufacturer"),
        ("Notes", "Notes"),
        ("Interface/ Cross-Compatibility", "Interface/ Cross-Compatibility"),
        ("RX", "Rx"),
        ("Driver", "Driver"),
        ("Screw", "Screw"),
    ];
    for (key, field) in extras {
        let value = record
            .get(field)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
        item.extra.insert(key.to_string(), value);
    }

    vec![OutputGroup::single(labels::SCANBODY, item)]
}
