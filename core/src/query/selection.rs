use serde::Deserialize;

/// One requested field. Leaves have no children; a relationship field
/// carries the sub-selection of its target entity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Selection {
    pub name: String,
    #[serde(default)]
    pub children: Vec<Selection>,
}

impl Selection {
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn link<I>(name: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = Selection>,
    {
        Self {
            name: name.into(),
            children: children.into_iter().collect(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Leaf selections for each name.
pub fn fields<I>(names: I) -> Vec<Selection>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    names.into_iter().map(Selection::field).collect()
}
