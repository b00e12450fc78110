use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stocktake_core::Item;

const GROCERY_KEYWORDS: &[&str] = &[
    "food", "drink", "milk", "bread", "fruit", "vegetable", "meat", "grocery", "groceries",
    "snack", "rice", "oil", "flour", "egg", "juice", "water", "cereal", "sugar", "salt",
    "spice", "tea", "coffee", "butter", "cheese", "yogurt", "biscuit", "cookie", "chips",
    "soda", "beverage", "produce", "dairy", "bakery", "frozen", "pantry", "condiment",
    "sauce", "soup", "canned", "grain", "bean", "nut", "seed", "honey", "jam", "jelly",
    "spread", "pasta", "noodle",
];

const GADGET_KEYWORDS: &[&str] = &[
    "phone", "laptop", "tablet", "headphone", "camera", "watch", "electronic", "gadget",
    "tech", "computer", "speaker", "mouse", "keyboard",
];

/// Keyword-derived item grouping. An item may fall into several categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Grocery,
    Gadget,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Grocery, Category::Gadget];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Grocery => GROCERY_KEYWORDS,
            Category::Gadget => GADGET_KEYWORDS,
        }
    }

    fn labels(self) -> &'static [&'static str] {
        match self {
            Category::Grocery => &["grocery", "groceries"],
            Category::Gadget => &["gadget", "electronic"],
        }
    }

    pub fn matches(self, item: &Item) -> bool {
        let name = item.name.to_lowercase();
        if self.keywords().iter().any(|keyword| name.contains(keyword)) {
            return true;
        }

        item.category.as_deref().is_some_and(|category| {
            let category = category.to_lowercase();
            self.labels().iter().any(|label| category.contains(label))
        })
    }

    pub fn of(item: &Item) -> Vec<Category> {
        Self::ALL
            .into_iter()
            .filter(|category| category.matches(item))
            .collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Grocery => f.write_str("grocery"),
            Category::Gadget => f.write_str("gadget"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grocery" | "groceries" => Ok(Category::Grocery),
            "gadget" | "gadgets" => Ok(Category::Gadget),
            other => Err(format!("unknown category {other:?}")),
        }
    }
}
