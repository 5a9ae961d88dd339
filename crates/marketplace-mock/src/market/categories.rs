use serde::{Deserialize, Serialize};

use super::{MarketData, Marketplace};
use crate::error::{MarketError, Result};

/// A catalogue category; `level` 1 is top-level.
#[derive(Debug, Clone)]
pub struct Category {
    pub category_id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub level: u8,
    pub display_order: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub category_id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub level: u8,
    pub display_order: u32,
    pub is_active: bool,
    pub children: Vec<CategoryView>,
}

impl CategoryView {
    fn leaf(category: &Category) -> Self {
        Self {
            category_id: category.category_id.clone(),
            name: category.name.clone(),
            parent_id: category.parent_id.clone(),
            level: category.level,
            display_order: category.display_order,
            is_active: category.is_active,
            children: Vec::new(),
        }
    }
}

fn category(id: &str, name: &str, parent: Option<&str>, order: u32, active: bool) -> Category {
    Category {
        category_id: id.to_string(),
        name: name.to_string(),
        parent_id: parent.map(str::to_string),
        level: id.matches('_').count() as u8,
        display_order: order,
        is_active: active,
    }
}

/// Default three-level tree every marketplace starts with.
pub(crate) fn seed() -> Vec<Category> {
    vec![
        category("CAT_1", "Fashion", None, 1, true),
        category("CAT_1_1", "Womenswear", Some("CAT_1"), 1, true),
        category("CAT_1_1_1", "Dresses", Some("CAT_1_1"), 1, true),
        category("CAT_1_1_2", "Knitwear", Some("CAT_1_1"), 2, true),
        category("CAT_1_2", "Menswear", Some("CAT_1"), 2, true),
        category("CAT_1_2_1", "Shirts", Some("CAT_1_2"), 1, true),
        category("CAT_2", "Digital", None, 2, true),
        category("CAT_2_1", "Mobile", Some("CAT_2"), 1, true),
        category("CAT_2_1_1", "Smartphones", Some("CAT_2_1"), 1, true),
        category("CAT_2_1_2", "Accessories", Some("CAT_2_1"), 2, true),
        category("CAT_3", "Food", None, 3, true),
        category("CAT_3_1", "Fresh", Some("CAT_3"), 1, true),
        category("CAT_3_1_1", "Fruit", Some("CAT_3_1"), 1, true),
        category("CAT_3_2", "Seasonal", Some("CAT_3"), 2, false),
    ]
}

impl MarketData {
    pub(crate) fn category(&self, category_id: &str) -> Result<&Category> {
        self.categories
            .iter()
            .find(|c| c.category_id == category_id)
            .ok_or_else(|| MarketError::business("Category not found"))
    }

    fn children_of(&self, parent_id: &str) -> Vec<&Category> {
        let mut children: Vec<_> = self
            .categories
            .iter()
            .filter(|c| c.parent_id.as_deref() == Some(parent_id))
            .collect();
        children.sort_by_key(|c| c.display_order);
        children
    }
}

impl Marketplace {
    /// Top-level categories with their children and grandchildren.
    pub async fn category_tree(&self) -> Vec<CategoryView> {
        let data = self.data.read().await;
        let mut roots: Vec<_> = data
            .categories
            .iter()
            .filter(|c| c.parent_id.is_none())
            .collect();
        roots.sort_by_key(|c| c.display_order);

        roots
            .into_iter()
            .map(|root| {
                let mut view = CategoryView::leaf(root);
                view.children = data
                    .children_of(&root.category_id)
                    .into_iter()
                    .map(|child| {
                        let mut child_view = CategoryView::leaf(child);
                        child_view.children = data
                            .children_of(&child.category_id)
                            .into_iter()
                            .map(CategoryView::leaf)
                            .collect();
                        child_view
                    })
                    .collect();
                view
            })
            .collect()
    }

    /// Flat list of active categories.
    pub async fn active_categories(&self) -> Vec<CategoryView> {
        let data = self.data.read().await;
        data.categories
            .iter()
            .filter(|c| c.is_active)
            .map(CategoryView::leaf)
            .collect()
    }
}
