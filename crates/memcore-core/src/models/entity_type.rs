use serde::{Deserialize, Serialize};

/// The closed entity taxonomy (§4.3). `Custom` is the escape hatch for the
/// soft/self-evolving ontology mode; strict mode still accepts it but
/// everything routed through `Custom` is expected to carry a
/// `properties.custom_label`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Person,
    Organization,
    Place,
    Food,
    Topic,
    Preference,
    Event,
    Activity,
    Medication,
    Media,
    Custom,
}

impl EntityType {
    pub const ALL: [EntityType; 11] = [
        EntityType::Person,
        EntityType::Organization,
        EntityType::Place,
        EntityType::Food,
        EntityType::Topic,
        EntityType::Preference,
        EntityType::Event,
        EntityType::Activity,
        EntityType::Medication,
        EntityType::Media,
        EntityType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "person",
            EntityType::Organization => "organization",
            EntityType::Place => "place",
            EntityType::Food => "food",
            EntityType::Topic => "topic",
            EntityType::Preference => "preference",
            EntityType::Event => "event",
            EntityType::Activity => "activity",
            EntityType::Medication => "medication",
            EntityType::Media => "media",
            EntityType::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<EntityType> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
