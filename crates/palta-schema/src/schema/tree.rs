use crate::definition::Definition;
use indexmap::IndexMap;
use serde_json::{Map, Value, json};

///
/// Tree
///
/// Mirror of the definition nesting. Used for conflict detection and
/// printing only, never for lookups.
///

#[derive(Clone, Debug, Default)]
pub struct Tree {
    root: IndexMap<String, TreeNode>,
}

///
/// TreeNode
///

#[derive(Clone, Debug)]
pub enum TreeNode {
    Branch(IndexMap<String, Self>),
    Field(Definition),
    Virtual,
}

impl TreeNode {
    const fn as_branch_mut(&mut self) -> Option<&mut IndexMap<String, Self>> {
        match self {
            Self::Branch(children) => Some(children),
            _ => None,
        }
    }
}

impl Tree {
    /// Store `def` at `path`, creating branches on the way.
    ///
    /// Fails with the dotted prefix that is already a leaf when an
    /// intermediate segment is bound to a field or a virtual.
    pub(crate) fn insert_field(&mut self, path: &str, def: Definition) -> Result<(), String> {
        let (branch, last) = self.branch_for(path)?;
        branch.insert(last.to_string(), TreeNode::Field(def));

        Ok(())
    }

    /// Place a virtual marker at `path`. Returns the dotted path that blocks
    /// it when the final segment is already a field or a nested group.
    pub(crate) fn insert_virtual(&mut self, path: &str) -> Result<(), String> {
        let (branch, last) = self.branch_for(path)?;

        match branch.get(last) {
            None => {
                branch.insert(last.to_string(), TreeNode::Virtual);
                Ok(())
            }
            Some(TreeNode::Virtual) => Ok(()),
            Some(_) => Err(path.to_string()),
        }
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&TreeNode> {
        let mut segments = path.split('.');
        let mut node = self.root.get(segments.next()?)?;

        for segment in segments {
            match node {
                TreeNode::Branch(children) => node = children.get(segment)?,
                _ => return None,
            }
        }

        Some(node)
    }

    // walk all but the last segment, creating branches
    fn branch_for<'a, 'p>(
        &'a mut self,
        path: &'p str,
    ) -> Result<(&'a mut IndexMap<String, TreeNode>, &'p str), String> {
        let mut segments: Vec<&str> = path.split('.').collect();
        let last = segments.pop().unwrap_or_default();

        let mut branch = &mut self.root;
        for (i, segment) in segments.iter().enumerate() {
            let node = branch
                .entry((*segment).to_string())
                .or_insert_with(|| TreeNode::Branch(IndexMap::new()));

            match node.as_branch_mut() {
                Some(children) => branch = children,
                None => return Err(segments[..=i].join(".")),
            }
        }

        Ok((branch, last))
    }

    /// JSON rendering used for diagnostics and fingerprints.
    #[must_use]
    pub fn to_value(&self) -> Value {
        branch_value(&self.root)
    }
}

fn branch_value(children: &IndexMap<String, TreeNode>) -> Value {
    Value::Object(
        children
            .iter()
            .map(|(key, node)| {
                let value = match node {
                    TreeNode::Branch(children) => branch_value(children),
                    TreeNode::Field(def) => def.to_value(),
                    TreeNode::Virtual => json!({ "$virtual": true }),
                };
                (key.clone(), value)
            })
            .collect::<Map<_, _>>(),
    )
}

///
/// TESTS
///
