//! Shop catalogue
//!
//! Items are bought with score. One-time unlocks drop out of the offer
//! list once owned.

use serde::Serialize;

use super::state::Inventory;

/// Purchasable items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShopItem {
    /// Jump again in mid-air
    DoubleJump,
    /// Adds a heart slot and fills it
    MaxLife,
    /// Restores one life
    Heal,
    /// Unlocks the 5 s invincibility ability
    Immortality,
}

impl ShopItem {
    pub const ALL: [ShopItem; 4] = [
        ShopItem::DoubleJump,
        ShopItem::MaxLife,
        ShopItem::Heal,
        ShopItem::Immortality,
    ];

    pub fn cost(&self) -> u64 {
        match self {
            ShopItem::DoubleJump => 1000,
            ShopItem::MaxLife => 1500,
            ShopItem::Heal => 1000,
            ShopItem::Immortality => 3000,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShopItem::DoubleJump => "DOUBLE JUMP",
            ShopItem::MaxLife => "MAX LIFE UP",
            ShopItem::Heal => "REPAIR KIT",
            ShopItem::Immortality => "IMMORTALITY",
        }
    }

    /// Whether the item can only be bought once per run
    pub fn one_time(&self) -> bool {
        matches!(self, ShopItem::DoubleJump | ShopItem::Immortality)
    }

    /// Whether the inventory already holds this one-time unlock
    pub fn owned(&self, inventory: &Inventory) -> bool {
        match self {
            ShopItem::DoubleJump => inventory.has_double_jump,
            ShopItem::Immortality => inventory.has_immortality,
            ShopItem::MaxLife | ShopItem::Heal => false,
        }
    }
}

/// Items currently on offer for this inventory
pub fn offers(inventory: &Inventory) -> Vec<ShopItem> {
    ShopItem::ALL
        .into_iter()
        .filter(|item| !(item.one_time() && item.owned(inventory)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offers_hide_owned_unlocks() {
        let mut inventory = Inventory::default();
        assert_eq!(offers(&inventory).len(), 4);

        inventory.has_double_jump = true;
        assert!(!offers(&inventory).contains(&ShopItem::DoubleJump));

        inventory.has_immortality = true;
        assert_eq!(offers(&inventory), vec![ShopItem::MaxLife, ShopItem::Heal]);
    }
}
