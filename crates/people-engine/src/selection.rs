/// The fields requested from a result, as a tree.
///
/// An empty selection on a record means "its scalar fields".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    fields: Vec<SelectedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedField {
    pub name: String,
    pub alias: Option<String>,
    pub selection: Selection,
}

impl SelectedField {
    /// The key the field is written under in the result.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects each of the given leaf fields.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(Self::new(), |selection, name| selection.field(name))
    }

    pub fn field(self, name: impl Into<String>) -> Self {
        self.nested(name, Selection::new())
    }

    pub fn aliased(mut self, alias: impl Into<String>, name: impl Into<String>) -> Self {
        self.fields.push(SelectedField {
            name: name.into(),
            alias: Some(alias.into()),
            selection: Selection::new(),
        });
        self
    }

    pub fn nested(mut self, name: impl Into<String>, selection: Selection) -> Self {
        self.fields.push(SelectedField {
            name: name.into(),
            alias: None,
            selection,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedField> {
        self.fields.iter()
    }
}
