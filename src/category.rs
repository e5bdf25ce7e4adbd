//! The fixed set of transaction and budget categories.
//!
//! Categories are stored as normalized codes (e.g. `FOOD_DINING`) and shown
//! to clients as display labels (e.g. "Food & Dining"). The mapping is total
//! and invertible for the 11 known codes; any unknown code read from the
//! store falls back to [Category::Other] rather than erroring.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// One of the 11 categories a transaction or budget can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Restaurants, cafes, and takeaways.
    FoodDining,
    /// Fuel, public transport, and ride shares.
    Transportation,
    /// General retail purchases.
    Shopping,
    /// Streaming, events, and hobbies.
    Entertainment,
    /// Recurring household bills.
    BillsUtilities,
    /// Medical costs.
    Healthcare,
    /// Trips and accommodation.
    Travel,
    /// Courses, books, and tuition.
    Education,
    /// Supermarket shopping.
    Groceries,
    /// Rent payments.
    Rent,
    /// Anything that does not fit the above.
    Other,
}

/// All categories in their canonical order.
pub const ALL_CATEGORIES: [Category; 11] = [
    Category::FoodDining,
    Category::Transportation,
    Category::Shopping,
    Category::Entertainment,
    Category::BillsUtilities,
    Category::Healthcare,
    Category::Travel,
    Category::Education,
    Category::Groceries,
    Category::Rent,
    Category::Other,
];

impl Category {
    /// The normalized code used in the store.
    pub fn code(self) -> &'static str {
        match self {
            Category::FoodDining => "FOOD_DINING",
            Category::Transportation => "TRANSPORTATION",
            Category::Shopping => "SHOPPING",
            Category::Entertainment => "ENTERTAINMENT",
            Category::BillsUtilities => "BILLS_UTILITIES",
            Category::Healthcare => "HEALTHCARE",
            Category::Travel => "TRAVEL",
            Category::Education => "EDUCATION",
            Category::Groceries => "GROCERIES",
            Category::Rent => "RENT",
            Category::Other => "OTHER",
        }
    }

    /// The display label used at the API boundary.
    pub fn label(self) -> &'static str {
        match self {
            Category::FoodDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::BillsUtilities => "Bills & Utilities",
            Category::Healthcare => "Healthcare",
            Category::Travel => "Travel",
            Category::Education => "Education",
            Category::Groceries => "Groceries",
            Category::Rent => "Rent",
            Category::Other => "Other",
        }
    }

    /// Look up a category by its display label.
    ///
    /// Unknown labels return `None`; callers at the API boundary reject
    /// them as validation errors on writes and skip the filter on reads.
    pub fn from_label(label: &str) -> Option<Category> {
        ALL_CATEGORIES
            .into_iter()
            .find(|category| category.label() == label)
    }

    /// Look up a category by its storage code.
    ///
    /// The lookup is total: codes that are not in the known set fold into
    /// [Category::Other], so stale or foreign rows still display.
    pub fn from_code(code: &str) -> Category {
        ALL_CATEGORIES
            .into_iter()
            .find(|category| category.code() == code)
            .unwrap_or(Category::Other)
    }

    /// Look up a category by its display label, or fail with
    /// [Error::UnknownCategory].
    pub fn parse_label(label: &str) -> Result<Category, Error> {
        Self::from_label(label).ok_or_else(|| Error::UnknownCategory(label.to_owned()))
    }
}

// Categories cross the wire as display labels.
impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;

        // Accept codes as well so cached snapshots round-trip, and fold
        // anything unknown into Other to match the display fallback.
        Ok(Category::from_label(&label).unwrap_or_else(|| Category::from_code(&label)))
    }
}

#[cfg(test)]
mod category_mapping_tests {
    use super::{ALL_CATEGORIES, Category};
    use crate::Error;

    #[test]
    fn label_code_round_trip_is_identity() {
        for category in ALL_CATEGORIES {
            let code = Category::from_label(category.label())
                .expect("label should map to a category")
                .code();

            assert_eq!(Category::from_code(code), category);
        }
    }

    #[test]
    fn unknown_code_falls_back_to_other() {
        assert_eq!(Category::from_code("CRYPTO"), Category::Other);
        assert_eq!(Category::from_code(""), Category::Other);
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert_eq!(
            Category::parse_label("Gambling"),
            Err(Error::UnknownCategory("Gambling".to_string()))
        );
    }

    #[test]
    fn serializes_as_display_label() {
        let json = serde_json::to_string(&Category::FoodDining).unwrap();

        assert_eq!(json, "\"Food & Dining\"");
    }

    #[test]
    fn deserializes_from_label_or_code() {
        let from_label: Category = serde_json::from_str("\"Bills & Utilities\"").unwrap();
        let from_code: Category = serde_json::from_str("\"BILLS_UTILITIES\"").unwrap();

        assert_eq!(from_label, Category::BillsUtilities);
        assert_eq!(from_code, Category::BillsUtilities);
    }
}
