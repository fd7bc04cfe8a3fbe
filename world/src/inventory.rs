//! Player inventory: collected and crafted items in pick-up order.

use dungeonmania_core::{EntityId, EntityKind, InventoryView, ItemSnapshot, Recipe};

/// Item held by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Item {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
    /// Remaining uses for durable items.
    pub(crate) durability: Option<u32>,
    /// Key number for keys.
    pub(crate) key: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub(crate) fn has_weapon(&self) -> bool {
        self.items.iter().any(|item| item.kind.is_weapon())
    }

    /// Key carried by the player, if any.
    pub(crate) fn key(&self) -> Option<&Item> {
        self.items.iter().find(|item| item.kind == EntityKind::Key)
    }

    /// Identifiers of the first `count` items of `kind`, or `None` when short.
    pub(crate) fn first_n(&self, kind: EntityKind, count: u32) -> Option<Vec<EntityId>> {
        let wanted = usize::try_from(count).ok()?;
        let ids: Vec<EntityId> = self
            .items
            .iter()
            .filter(|item| item.kind == kind)
            .map(|item| item.id)
            .take(wanted)
            .collect();
        (ids.len() == wanted).then_some(ids)
    }

    /// Items a recipe would consume, picking the first satisfiable option of
    /// every ingredient.
    pub(crate) fn plan_recipe(&self, recipe: &Recipe) -> Option<Vec<EntityId>> {
        let mut consumed = Vec::new();
        for ingredient in recipe.ingredients() {
            let chosen = ingredient
                .options()
                .iter()
                .find_map(|kind| self.first_n(*kind, ingredient.count()))?;
            consumed.extend(chosen);
        }
        Some(consumed)
    }

    /// Spends one use of a durable item. Returns `true` when it broke.
    pub(crate) fn wear(&mut self, id: EntityId) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return false;
        };
        let item = &mut self.items[index];
        let Some(remaining) = item.durability else {
            return false;
        };
        let remaining = remaining.saturating_sub(1);
        item.durability = Some(remaining);
        if remaining == 0 {
            let _ = self.items.remove(index);
            return true;
        }
        false
    }

    pub(crate) fn view(&self) -> InventoryView {
        InventoryView::from_items(
            self.items
                .iter()
                .map(|item| ItemSnapshot {
                    id: item.id,
                    kind: item.kind,
                    durability: item.durability,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32, kind: EntityKind) -> Item {
        Item {
            id: EntityId::new(id),
            kind,
            durability: None,
            key: None,
        }
    }

    #[test]
    fn first_n_requires_full_count() {
        let mut inventory = Inventory::new();
        inventory.push(item(1, EntityKind::Treasure));
        inventory.push(item(2, EntityKind::Wood));
        inventory.push(item(3, EntityKind::Treasure));

        assert_eq!(
            inventory.first_n(EntityKind::Treasure, 2),
            Some(vec![EntityId::new(1), EntityId::new(3)])
        );
        assert_eq!(inventory.first_n(EntityKind::Treasure, 3), None);
        assert_eq!(inventory.first_n(EntityKind::Arrow, 0), Some(Vec::new()));
    }

    #[test]
    fn shield_recipe_falls_back_to_key() {
        let mut inventory = Inventory::new();
        inventory.push(item(1, EntityKind::Wood));
        inventory.push(item(2, EntityKind::Wood));
        inventory.push(item(3, EntityKind::Key));

        let recipe = EntityKind::Shield.recipe().expect("shield recipe");
        assert_eq!(
            inventory.plan_recipe(&recipe),
            Some(vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)])
        );

        let bow = EntityKind::Bow.recipe().expect("bow recipe");
        assert_eq!(inventory.plan_recipe(&bow), None);
    }

    #[test]
    fn wearing_to_zero_removes_item() {
        let mut inventory = Inventory::new();
        inventory.push(Item {
            durability: Some(2),
            ..item(7, EntityKind::Sword)
        });

        assert!(!inventory.wear(EntityId::new(7)));
        assert_eq!(inventory.view().iter().next().and_then(|item| item.durability), Some(1));
        assert!(inventory.wear(EntityId::new(7)));
        assert!(inventory.view().is_empty());
        assert!(!inventory.has_weapon());
    }
}
