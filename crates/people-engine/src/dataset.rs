use crate::record::{Hobby, Person};

/// Records loaded into the store at startup.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Dataset {
    pub people: Vec<Person>,
    pub hobbies: Vec<Hobby>,
}

impl Dataset {
    /// The dataset served when no dataset file is configured.
    pub fn builtin() -> Self {
        let hobbies = [(1, "chess"), (2, "running"), (3, "painting"), (4, "climbing")]
            .into_iter()
            .map(|(id, name)| Hobby {
                id,
                name: name.to_string(),
            })
            .collect();

        let people = [
            (1, "Ada", vec![1, 2]),
            (2, "Linus", vec![2, 3]),
            (3, "Margaret", vec![4]),
        ]
        .into_iter()
        .map(|(id, name, hobbies)| Person {
            id,
            name: name.to_string(),
            hobbies,
        })
        .collect();

        Self { people, hobbies }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
