//! # Feature: Persona Registry
//!
//! The two fixed debate personas: Agent A argues for the user's proposal, Agent B against it.
//! Each persona has a system instruction loaded from prompt/*.md files at compile time
//! and its own sampling parameters.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Added display name and description for the personas endpoint
//! - 1.0.0: Initial release with advocate and skeptic personas

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two debate agents a persona, turn, or result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaId {
    AgentA,
    AgentB,
}

impl PersonaId {
    pub const ALL: [PersonaId; 2] = [PersonaId::AgentA, PersonaId::AgentB];

    /// The opposing agent
    pub fn other(self) -> PersonaId {
        match self {
            PersonaId::AgentA => PersonaId::AgentB,
            PersonaId::AgentB => PersonaId::AgentA,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaId::AgentA => "agent_a",
            PersonaId::AgentB => "agent_b",
        }
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Pro,
    Con,
}

/// Sampling parameters sent with every call for a persona
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    pub stance: Stance,
    pub name: String,
    pub description: String,
    pub system_instruction: String,
    pub generation_params: GenerationParams,
}

/// Read-only after construction; shared across requests behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    agent_a: Persona,
    agent_b: Persona,
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonaRegistry {
    pub fn new() -> Self {
        let agent_a = Persona {
            id: PersonaId::AgentA,
            stance: Stance::Pro,
            name: "The Advocate".to_string(),
            description: "Makes the strongest evidence-based case in favor of the proposal"
                .to_string(),
            system_instruction: include_str!("../../../prompt/advocate.md").to_string(),
            generation_params: GenerationParams {
                temperature: 0.8,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 2048,
            },
        };

        let agent_b = Persona {
            id: PersonaId::AgentB,
            stance: Stance::Con,
            name: "The Skeptic".to_string(),
            description: "Stress-tests the proposal and surfaces its costs and risks".to_string(),
            system_instruction: include_str!("../../../prompt/skeptic.md").to_string(),
            generation_params: GenerationParams {
                temperature: 0.7,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 2048,
            },
        };

        PersonaRegistry { agent_a, agent_b }
    }

    pub fn get(&self, id: PersonaId) -> &Persona {
        match id {
            PersonaId::AgentA => &self.agent_a,
            PersonaId::AgentB => &self.agent_b,
        }
    }

    pub fn list(&self) -> [&Persona; 2] {
        [&self.agent_a, &self.agent_b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup_is_not_cross_assigned() {
        let registry = PersonaRegistry::new();

        let a = registry.get(PersonaId::AgentA);
        let b = registry.get(PersonaId::AgentB);

        assert_eq!(a.id, PersonaId::AgentA);
        assert_eq!(a.stance, Stance::Pro);
        assert!(a.system_instruction.contains("Advocate"));

        assert_eq!(b.id, PersonaId::AgentB);
        assert_eq!(b.stance, Stance::Con);
        assert!(b.system_instruction.contains("Skeptic"));

        assert_ne!(a.system_instruction, b.system_instruction);
    }

    #[test]
    fn test_persona_id_other_and_wire_names() {
        assert_eq!(PersonaId::AgentA.other(), PersonaId::AgentB);
        assert_eq!(PersonaId::AgentB.other(), PersonaId::AgentA);

        assert_eq!(serde_json::to_string(&PersonaId::AgentA).unwrap(), "\"agent_a\"");
        let parsed: PersonaId = serde_json::from_str("\"agent_b\"").unwrap();
        assert_eq!(parsed, PersonaId::AgentB);
        assert_eq!(PersonaId::AgentB.to_string(), "agent_b");
    }

    #[test]
    fn test_list_is_in_agent_order() {
        let registry = PersonaRegistry::new();
        let ids: Vec<PersonaId> = registry.list().iter().map(|p| p.id).collect();
        assert_eq!(ids, PersonaId::ALL.to_vec());
    }
}
