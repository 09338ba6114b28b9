/// Identifier of the synthetic root node
pub const ROOT_CATEGORY_ID: &str = "products";

/// One node of the category tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: String,
    pub display_name: String,
    pub parent_id: Option<String>,
}

impl CategoryNode {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            parent_id: parent_id.map(str::to_string),
        }
    }
}

/// A top-level category together with its subcategories in listing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopCategory {
    pub node: CategoryNode,
    pub subcategories: Vec<CategoryNode>,
}

/// Two-level category tree under a synthetic `products` root
///
/// Top-level categories are identified by their display name, which is the
/// only stable key the navigation menu offers for them. Subcategories carry
/// the source's own ids, which the listing endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTree {
    top: Vec<TopCategory>,
}

impl Default for CategoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryTree {
    pub fn new() -> Self {
        Self { top: Vec::new() }
    }

    /// Appends a top-level category and returns its index
    ///
    /// A repeated name reuses the existing entry so that its subcategories merge.
    pub fn push_category(&mut self, name: &str) -> usize {
        if let Some(index) = self.top.iter().position(|c| c.node.id == name) {
            return index;
        }
        self.top.push(TopCategory {
            node: CategoryNode::new(name, name, Some(ROOT_CATEGORY_ID)),
            subcategories: Vec::new(),
        });
        self.top.len() - 1
    }

    /// Appends a subcategory under the top-level category at `index`
    pub fn push_subcategory(&mut self, index: usize, id: &str, name: &str) {
        if let Some(parent) = self.top.get_mut(index) {
            let node = CategoryNode::new(id, name, Some(&parent.node.id));
            parent.subcategories.push(node);
        }
    }

    /// Builds a tree from `(category, [(subcategory id, subcategory name)])` pairs
    pub fn from_pairs<'a, I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, S)>,
        S: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tree = Self::new();
        for (name, subs) in pairs {
            let index = tree.push_category(name);
            for (id, sub_name) in subs {
                tree.push_subcategory(index, id, sub_name);
            }
        }
        tree
    }

    pub fn categories(&self) -> &[TopCategory] {
        &self.top
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
    }

    pub fn subcategory_count(&self) -> usize {
        self.top.iter().map(|c| c.subcategories.len()).sum()
    }
}
