use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

use crate::portfolio::Portfolio;

/// Stable identity of a saved portfolio. Allocated once on creation and never reused,
/// so it keeps pointing at the same entry when the collection shifts around it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
#[display("#{_0}")]
pub struct DocumentId(u64);

impl DocumentId {
    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// A saved entry of the portfolio collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Deref)]
pub struct Document {
    pub id: DocumentId,
    #[deref]
    #[serde(flatten)]
    pub portfolio: Portfolio,
}

#[cfg(test)]
mod test {
    use super::{Document, DocumentId};
    use crate::portfolio::Portfolio;

    #[test]
    fn test_id_is_flattened_into_portfolio() {
        let mut portfolio = Portfolio::empty();
        portfolio.about.name = "Ada".into();
        let document = Document {
            id: DocumentId::from(7),
            portfolio,
        };

        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["about"]["name"], "Ada");

        let parsed: Document = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, document);
        assert_eq!(parsed.about.name, "Ada");
    }
}
