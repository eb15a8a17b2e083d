use crate::Result;
use anyhow::{anyhow, bail, ensure};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The name shown for an expense whose category id cannot be resolved.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

// Stable ids for the default categories so that seeding never creates duplicates.
pub const FOOD_ID: Uuid = Uuid::from_u128(0x11111111_1111_1111_1111_111111111111);
pub const TRANSPORT_ID: Uuid = Uuid::from_u128(0x22222222_2222_2222_2222_222222222222);
pub const GROCERIES_ID: Uuid = Uuid::from_u128(0x33333333_3333_3333_3333_333333333333);
pub const RENT_ID: Uuid = Uuid::from_u128(0x44444444_4444_4444_4444_444444444444);
pub const BILLS_ID: Uuid = Uuid::from_u128(0x55555555_5555_5555_5555_555555555555);
pub const SHOPPING_ID: Uuid = Uuid::from_u128(0x66666666_6666_6666_6666_666666666666);
pub const HEALTH_ID: Uuid = Uuid::from_u128(0x77777777_7777_7777_7777_777777777777);
pub const ENTERTAINMENT_ID: Uuid = Uuid::from_u128(0x88888888_8888_8888_8888_888888888888);
pub const COFFEE_ID: Uuid = Uuid::from_u128(0x99999999_9999_9999_9999_999999999999);
pub const OTHER_ID: Uuid = Uuid::from_u128(0xaaaaaaaa_aaaa_aaaa_aaaa_aaaaaaaaaaaa);

/// (id, name, icon, color)
const DEFAULTS: [(Uuid, &str, &str, &str); 10] = [
    (FOOD_ID, "Food", "fork.knife", "red"),
    (TRANSPORT_ID, "Transport", "car.fill", "blue"),
    (GROCERIES_ID, "Groceries", "cart.fill", "green"),
    (RENT_ID, "Rent", "house.fill", "indigo"),
    (BILLS_ID, "Bills", "doc.text.fill", "orange"),
    (SHOPPING_ID, "Shopping", "bag.fill", "pink"),
    (HEALTH_ID, "Health", "cross.case.fill", "teal"),
    (ENTERTAINMENT_ID, "Entertainment", "gamecontroller.fill", "purple"),
    (COFFEE_ID, "Coffee", "cup.and.saucer.fill", "brown"),
    (OTHER_ID, "Other", "square.grid.2x2.fill", "gray"),
];

/// All known categories, in no particular order.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Categories {
    data: Vec<Category>,
}

impl Categories {
    pub fn new(data: Vec<Category>) -> Self {
        Self { data }
    }

    /// The categories a fresh cashbook starts with.
    pub fn defaults() -> Self {
        let data = DEFAULTS
            .iter()
            .zip(0u32..)
            .map(|((id, name, icon, color), sort_order)| Category {
                id: *id,
                name: name.to_string(),
                icon: icon.to_string(),
                color_key: color.to_string(),
                sort_order,
                is_default: true,
                is_archived: false,
            })
            .collect();
        Self { data }
    }

    pub fn data(&self) -> &Vec<Category> {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The lookup table used when rendering category names.
    pub fn by_id(&self) -> HashMap<Uuid, Category> {
        self.data.iter().map(|c| (c.id, c.clone())).collect()
    }

    pub fn get(&self, id: Uuid) -> Option<&Category> {
        self.data.iter().find(|c| c.id == id)
    }

    /// Case-insensitive lookup by display name, archived categories included.
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        let name = name.trim();
        self.data
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Like `find_by_name` but skips archived categories. New and edited expenses, the default
    /// category and history filters can only pick from these.
    pub fn find_active_by_name(&self, name: &str) -> Option<&Category> {
        self.find_by_name(name).filter(|c| !c.is_archived)
    }

    /// Appends a user-defined category after the last one in display order.
    ///
    /// # Errors
    /// Fails for a blank name or a name that is already taken, ignoring case.
    pub fn add(&mut self, name: &str, icon: Option<&str>) -> Result<&Category> {
        let name = name.trim();
        ensure!(!name.is_empty(), "A category name cannot be empty");
        ensure!(
            self.find_by_name(name).is_none(),
            "A category named '{name}' already exists"
        );
        let sort_order = self
            .data
            .iter()
            .map(|c| c.sort_order.saturating_add(1))
            .max()
            .unwrap_or(0);
        let mut category = Category::new(name, sort_order);
        if let Some(icon) = icon.map(str::trim).filter(|i| !i.is_empty()) {
            category.icon = icon.to_string();
        }
        self.data.push(category);
        let index = self.data.len() - 1;
        Ok(&self.data[index])
    }

    /// Archives or restores the named category. Archived categories keep their expenses but
    /// cannot be picked for new ones.
    ///
    /// # Errors
    /// Fails for an unknown name, or when archiving "Other".
    pub fn set_archived(&mut self, name: &str, archived: bool) -> Result<&Category> {
        let category = self.find_by_name_mut(name)?;
        ensure!(
            !(archived && category.id == OTHER_ID),
            "The '{}' category cannot be archived",
            category.name
        );
        category.is_archived = archived;
        Ok(category)
    }

    /// Moves the named categories to the front, in the order given. The remaining categories
    /// follow in their current display order. Sort orders are renumbered from zero.
    ///
    /// # Errors
    /// Fails for an unknown or repeated name.
    pub fn reorder(&mut self, names: &[String]) -> Result<()> {
        let mut front: Vec<Uuid> = Vec::with_capacity(names.len());
        for name in names {
            let id = self
                .find_by_name(name)
                .map(|c| c.id)
                .ok_or_else(|| anyhow!("Unknown category '{}'", name.trim()))?;
            ensure!(!front.contains(&id), "Category '{}' is listed twice", name.trim());
            front.push(id);
        }
        let rest: Vec<Uuid> = self
            .sorted()
            .into_iter()
            .map(|c| c.id)
            .filter(|id| !front.contains(id))
            .collect();
        for (sort_order, id) in (0u32..).zip(front.iter().chain(&rest)) {
            if let Some(category) = self.data.iter_mut().find(|c| c.id == *id) {
                category.sort_order = sort_order;
            }
        }
        Ok(())
    }

    /// Removes the named category and renumbers the rest. Expenses that referenced it are left
    /// as they are and show up as `UNKNOWN_CATEGORY`.
    ///
    /// # Errors
    /// Fails for an unknown name, or when removing "Other".
    pub fn remove(&mut self, name: &str) -> Result<Category> {
        let id = self.find_by_name_mut(name)?.id;
        if id == OTHER_ID {
            bail!("The '{}' category cannot be deleted", name.trim());
        }
        let order: Vec<Uuid> = self.sorted().into_iter().map(|c| c.id).collect();
        let index = self
            .data
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| anyhow!("Unknown category '{}'", name.trim()))?;
        let removed = self.data.remove(index);
        for (sort_order, id) in (0u32..).zip(order.iter().filter(|i| **i != removed.id)) {
            if let Some(category) = self.data.iter_mut().find(|c| c.id == *id) {
                category.sort_order = sort_order;
            }
        }
        Ok(removed)
    }

    fn find_by_name_mut(&mut self, name: &str) -> Result<&mut Category> {
        let trimmed = name.trim();
        self.data
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| anyhow!("Unknown category '{trimmed}'"))
    }

    /// Categories ordered for display: by `sort_order`, then name.
    pub fn sorted(&self) -> Vec<&Category> {
        let mut sorted: Vec<&Category> = self.data.iter().collect();
        sorted.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        sorted
    }
}

/// A user-facing expense category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Category {
    id: Uuid,
    name: String,
    icon: String,
    color_key: String,
    sort_order: u32,
    #[serde(default)]
    is_default: bool,
    #[serde(default)]
    is_archived: bool,
}

impl Category {
    /// Creates a user-defined category with a random id.
    pub fn new(name: impl Into<String>, sort_order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: String::from("tag.fill"),
            color_key: String::from("gray"),
            sort_order,
            is_default: false,
            is_archived: false,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn color_key(&self) -> &str {
        &self.color_key
    }

    pub fn sort_order(&self) -> u32 {
        self.sort_order
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn is_archived(&self) -> bool {
        self.is_archived
    }
}

/// Resolves `id` to a display name, falling back to `UNKNOWN_CATEGORY`.
pub fn category_name(categories_by_id: &HashMap<Uuid, Category>, id: Uuid) -> &str {
    categories_by_id
        .get(&id)
        .map(|c| c.name())
        .unwrap_or(UNKNOWN_CATEGORY)
}
