//! Ordered Red-Black Tree
//!
//! A self-balancing tree used by the sweep for both the beachline and the
//! circle-event queue. Unlike a key-ordered map, nodes are placed explicitly:
//! `insert_successor` puts a new node immediately after an existing one (or
//! at the front), so the caller decides the ordering. Every node also sits in
//! a doubly-linked chain for O(1) predecessor/successor access, which the
//! beachline uses constantly.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Removed slots go
//! onto a free list and are reused by later insertions.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(u32);

#[derive(Debug)]
struct Node<T> {
    value: T,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    red: bool,
}

#[derive(Debug)]
pub(crate) struct RedBlackTree<T> {
    nodes: Vec<Node<T>>,
    root: Option<NodeId>,
    free: Vec<NodeId>,
    len: usize,
}

impl<T: Copy> RedBlackTree<T> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            free: Vec::new(),
            len: 0,
        }
    }

    #[inline]
    fn n(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    fn n_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.0 as usize]
    }

    #[inline]
    pub(crate) fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &T {
        &self.n(id).value
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.n_mut(id).value
    }

    #[inline]
    pub(crate) fn left(&self, id: NodeId) -> Option<NodeId> {
        self.n(id).left
    }

    #[inline]
    pub(crate) fn right(&self, id: NodeId) -> Option<NodeId> {
        self.n(id).right
    }

    #[inline]
    pub(crate) fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.n(id).prev
    }

    #[inline]
    pub(crate) fn next(&self, id: NodeId) -> Option<NodeId> {
        self.n(id).next
    }

    /// First node in order, walking the left spine
    pub(crate) fn first(&self) -> Option<NodeId> {
        self.root.map(|r| self.leftmost(r))
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.n(id).left {
            id = left;
        }
        id
    }

    fn alloc(&mut self, value: T) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                let node = self.n_mut(id);
                node.value = value;
                node.parent = None;
                node.left = None;
                node.right = None;
                node.prev = None;
                node.next = None;
                node.red = false;
                id
            }
            None => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(Node {
                    value,
                    parent: None,
                    left: None,
                    right: None,
                    prev: None,
                    next: None,
                    red: false,
                });
                id
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.free.push(id);
    }

    /// Insert `value` immediately after `node` in the tree order, or at the
    /// very front when `node` is `None`. Returns the new node's ID.
    pub(crate) fn insert_successor(&mut self, node: Option<NodeId>, value: T) -> NodeId {
        let successor = self.alloc(value);
        self.len += 1;
        let mut parent: Option<NodeId>;

        if let Some(mut node) = node {
            // splice into the ordered chain
            self.n_mut(successor).prev = Some(node);
            let node_next = self.n(node).next;
            self.n_mut(successor).next = node_next;
            if let Some(next) = node_next {
                self.n_mut(next).prev = Some(successor);
            }
            self.n_mut(node).next = Some(successor);

            // structural insert: leftmost slot of the right subtree,
            // or directly as right child
            if let Some(right) = self.n(node).right {
                node = self.leftmost(right);
                self.n_mut(node).left = Some(successor);
            } else {
                self.n_mut(node).right = Some(successor);
            }
            parent = Some(node);
        } else if let Some(root) = self.root {
            let node = self.leftmost(root);
            self.n_mut(successor).prev = None;
            self.n_mut(successor).next = Some(node);
            self.n_mut(node).prev = Some(successor);
            self.n_mut(node).left = Some(successor);
            parent = Some(node);
        } else {
            self.n_mut(successor).prev = None;
            self.n_mut(successor).next = None;
            self.root = Some(successor);
            parent = None;
        }

        self.n_mut(successor).left = None;
        self.n_mut(successor).right = None;
        self.n_mut(successor).parent = parent;
        self.n_mut(successor).red = true;

        // rebalance upward
        let mut node = successor;
        while let Some(mut p) = parent {
            if !self.n(p).red {
                break;
            }
            let Some(grandpa) = self.n(p).parent else { break };

            if Some(p) == self.n(grandpa).left {
                let uncle = self.n(grandpa).right;
                match uncle {
                    Some(u) if self.n(u).red => {
                        self.n_mut(p).red = false;
                        self.n_mut(u).red = false;
                        self.n_mut(grandpa).red = true;
                        node = grandpa;
                    }
                    _ => {
                        if Some(node) == self.n(p).right {
                            self.rotate_left(p);
                            node = p;
                            let Some(np) = self.n(node).parent else { break };
                            p = np;
                        }
                        self.n_mut(p).red = false;
                        self.n_mut(grandpa).red = true;
                        self.rotate_right(grandpa);
                    }
                }
            } else {
                let uncle = self.n(grandpa).left;
                match uncle {
                    Some(u) if self.n(u).red => {
                        self.n_mut(p).red = false;
                        self.n_mut(u).red = false;
                        self.n_mut(grandpa).red = true;
                        node = grandpa;
                    }
                    _ => {
                        if Some(node) == self.n(p).left {
                            self.rotate_right(p);
                            node = p;
                            let Some(np) = self.n(node).parent else { break };
                            p = np;
                        }
                        self.n_mut(p).red = false;
                        self.n_mut(grandpa).red = true;
                        self.rotate_left(grandpa);
                    }
                }
            }

            parent = self.n(node).parent;
        }

        if let Some(root) = self.root {
            self.n_mut(root).red = false;
        }
        successor
    }

    /// Remove a node, rebalancing afterwards. The slot is recycled, so the
    /// ID must not be used again.
    pub(crate) fn remove(&mut self, id: NodeId) {
        // unlink from the ordered chain
        let prev = self.n(id).prev;
        let next_link = self.n(id).next;
        if let Some(n) = next_link {
            self.n_mut(n).prev = prev;
        }
        if let Some(p) = prev {
            self.n_mut(p).next = next_link;
        }
        self.n_mut(id).next = None;
        self.n_mut(id).prev = None;

        let mut parent = self.n(id).parent;
        let left = self.n(id).left;
        let right = self.n(id).right;

        let next = match (left, right) {
            (None, r) => r,
            (l, None) => l,
            (_, Some(r)) => Some(self.leftmost(r)),
        };

        match parent {
            Some(p) => {
                if self.n(p).left == Some(id) {
                    self.n_mut(p).left = next;
                } else {
                    self.n_mut(p).right = next;
                }
            }
            None => self.root = next,
        }

        // enforce red-black rules
        let is_red;
        let mut node: Option<NodeId>;
        if let (Some(l), Some(r), Some(nx)) = (left, right, next) {
            is_red = self.n(nx).red;
            self.n_mut(nx).red = self.n(id).red;
            self.n_mut(nx).left = Some(l);
            self.n_mut(l).parent = Some(nx);

            if Some(nx) != right {
                parent = self.n(nx).parent;
                let removed_parent = self.n(id).parent;
                self.n_mut(nx).parent = removed_parent;
                node = self.n(nx).right;
                if let Some(p) = parent {
                    self.n_mut(p).left = node;
                }
                self.n_mut(nx).right = Some(r);
                self.n_mut(r).parent = Some(nx);
            } else {
                self.n_mut(nx).parent = parent;
                parent = Some(nx);
                node = self.n(nx).right;
            }
        } else {
            is_red = self.n(id).red;
            node = next;
        }

        self.release(id);
        self.len -= 1;

        // node is now the successor's sole child and parent its new parent
        if let Some(n) = node {
            self.n_mut(n).parent = parent;
        }

        if is_red {
            return;
        }
        if let Some(n) = node {
            if self.n(n).red {
                self.n_mut(n).red = false;
                return;
            }
        }

        loop {
            if node == self.root {
                break;
            }
            let Some(p) = parent else { break };

            if node == self.n(p).left {
                let Some(mut sibling) = self.n(p).right else { break };
                if self.n(sibling).red {
                    self.n_mut(sibling).red = false;
                    self.n_mut(p).red = true;
                    self.rotate_left(p);
                    let Some(s) = self.n(p).right else { break };
                    sibling = s;
                }
                let s_left = self.n(sibling).left;
                let s_right = self.n(sibling).right;
                let left_red = s_left.map_or(false, |l| self.n(l).red);
                let right_red = s_right.map_or(false, |r| self.n(r).red);
                if left_red || right_red {
                    if !right_red {
                        if let Some(l) = s_left {
                            self.n_mut(l).red = false;
                        }
                        self.n_mut(sibling).red = true;
                        self.rotate_right(sibling);
                        let Some(s) = self.n(p).right else { break };
                        sibling = s;
                    }
                    self.n_mut(sibling).red = self.n(p).red;
                    self.n_mut(p).red = false;
                    if let Some(sr) = self.n(sibling).right {
                        self.n_mut(sr).red = false;
                    }
                    self.rotate_left(p);
                    node = self.root;
                    break;
                }
                self.n_mut(sibling).red = true;
            } else {
                let Some(mut sibling) = self.n(p).left else { break };
                if self.n(sibling).red {
                    self.n_mut(sibling).red = false;
                    self.n_mut(p).red = true;
                    self.rotate_right(p);
                    let Some(s) = self.n(p).left else { break };
                    sibling = s;
                }
                let s_left = self.n(sibling).left;
                let s_right = self.n(sibling).right;
                let left_red = s_left.map_or(false, |l| self.n(l).red);
                let right_red = s_right.map_or(false, |r| self.n(r).red);
                if left_red || right_red {
                    if !left_red {
                        if let Some(r) = s_right {
                            self.n_mut(r).red = false;
                        }
                        self.n_mut(sibling).red = true;
                        self.rotate_left(sibling);
                        let Some(s) = self.n(p).left else { break };
                        sibling = s;
                    }
                    self.n_mut(sibling).red = self.n(p).red;
                    self.n_mut(p).red = false;
                    if let Some(sl) = self.n(sibling).left {
                        self.n_mut(sl).red = false;
                    }
                    self.rotate_right(p);
                    node = self.root;
                    break;
                }
                self.n_mut(sibling).red = true;
            }

            node = Some(p);
            parent = self.n(p).parent;
            if self.n(p).red {
                break;
            }
        }

        if let Some(n) = node {
            self.n_mut(n).red = false;
        }
    }

    fn rotate_left(&mut self, node: NodeId) {
        let Some(right) = self.n(node).right else {
            return;
        };
        let parent = self.n(node).parent;

        match parent {
            Some(p) => {
                if self.n(p).left == Some(node) {
                    self.n_mut(p).left = Some(right);
                } else {
                    self.n_mut(p).right = Some(right);
                }
            }
            None => self.root = Some(right),
        }

        self.n_mut(right).parent = parent;
        self.n_mut(node).parent = Some(right);
        let right_left = self.n(right).left;
        self.n_mut(node).right = right_left;
        if let Some(rl) = right_left {
            self.n_mut(rl).parent = Some(node);
        }
        self.n_mut(right).left = Some(node);
    }

    fn rotate_right(&mut self, node: NodeId) {
        let Some(left) = self.n(node).left else {
            return;
        };
        let parent = self.n(node).parent;

        match parent {
            Some(p) => {
                if self.n(p).left == Some(node) {
                    self.n_mut(p).left = Some(left);
                } else {
                    self.n_mut(p).right = Some(left);
                }
            }
            None => self.root = Some(left),
        }

        self.n_mut(left).parent = parent;
        self.n_mut(node).parent = Some(left);
        let left_right = self.n(left).right;
        self.n_mut(node).left = left_right;
        if let Some(lr) = left_right {
            self.n_mut(lr).parent = Some(node);
        }
        self.n_mut(left).right = Some(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_order(tree: &RedBlackTree<i32>) -> Vec<i32> {
        let mut out = Vec::new();
        let mut node = tree.first();
        while let Some(id) = node {
            out.push(*tree.get(id));
            node = tree.next(id);
        }
        out
    }

    /// Returns the black height, panicking on any red-black violation.
    fn check_invariants(tree: &RedBlackTree<i32>) -> usize {
        fn walk(tree: &RedBlackTree<i32>, node: Option<NodeId>, parent_red: bool) -> usize {
            let Some(id) = node else {
                return 1;
            };
            let red = tree.n(id).red;
            assert!(!(red && parent_red), "red node with red parent");
            let lh = walk(tree, tree.left(id), red);
            let rh = walk(tree, tree.right(id), red);
            assert_eq!(lh, rh, "unequal black heights");
            lh + if red { 0 } else { 1 }
        }
        if let Some(root) = tree.root() {
            assert!(!tree.n(root).red, "red root");
        }
        walk(tree, tree.root(), false)
    }

    #[test]
    fn test_insert_at_front() {
        let mut tree = RedBlackTree::new();
        for v in [3, 2, 1] {
            tree.insert_successor(None, v);
        }
        assert_eq!(in_order(&tree), vec![1, 2, 3]);
        check_invariants(&tree);
    }

    #[test]
    fn test_insert_after_last() {
        let mut tree = RedBlackTree::new();
        let mut last = None;
        for v in 0..50 {
            last = Some(tree.insert_successor(last, v));
        }
        assert_eq!(in_order(&tree), (0..50).collect::<Vec<_>>());
        assert_eq!(tree.len(), 50);
        check_invariants(&tree);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut tree = RedBlackTree::new();
        let a = tree.insert_successor(None, 10);
        let _c = tree.insert_successor(Some(a), 30);
        let b = tree.insert_successor(Some(a), 20);
        assert_eq!(in_order(&tree), vec![10, 20, 30]);
        assert_eq!(tree.prev(b), Some(a));
        check_invariants(&tree);
    }

    #[test]
    fn test_chain_links() {
        let mut tree = RedBlackTree::new();
        let a = tree.insert_successor(None, 1);
        let b = tree.insert_successor(Some(a), 2);
        let c = tree.insert_successor(Some(b), 3);
        assert_eq!(tree.prev(a), None);
        assert_eq!(tree.next(a), Some(b));
        assert_eq!(tree.prev(c), Some(b));
        assert_eq!(tree.next(c), None);
    }

    #[test]
    fn test_remove_rebalances() {
        let mut tree = RedBlackTree::new();
        let mut ids = Vec::new();
        let mut last = None;
        for v in 0..32 {
            let id = tree.insert_successor(last, v);
            ids.push(id);
            last = Some(id);
        }
        // remove every other node
        for (i, id) in ids.iter().enumerate() {
            if i % 2 == 0 {
                tree.remove(*id);
                check_invariants(&tree);
            }
        }
        assert_eq!(
            in_order(&tree),
            (0..32).filter(|v| v % 2 == 1).collect::<Vec<_>>()
        );
        assert_eq!(tree.len(), 16);
    }

    #[test]
    fn test_remove_root_until_empty() {
        let mut tree = RedBlackTree::new();
        let mut last = None;
        for v in 0..10 {
            last = Some(tree.insert_successor(last, v));
        }
        while let Some(root) = tree.root() {
            tree.remove(root);
            check_invariants(&tree);
        }
        assert!(tree.is_empty());
        assert_eq!(tree.first(), None);
    }

    #[test]
    fn test_slots_are_recycled() {
        let mut tree = RedBlackTree::new();
        let mut last = None;
        for v in 0..8 {
            last = Some(tree.insert_successor(last, v));
        }
        let capacity = tree.nodes.len();
        while let Some(root) = tree.root() {
            tree.remove(root);
        }
        let mut last = None;
        for v in 0..8 {
            last = Some(tree.insert_successor(last, v));
        }
        assert_eq!(tree.nodes.len(), capacity);
        assert_eq!(in_order(&tree), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_interleaved_insert_remove() {
        let mut tree = RedBlackTree::new();
        let mut ids = Vec::new();
        let mut last = None;
        for v in 0..100 {
            let id = tree.insert_successor(last, v);
            ids.push((id, v));
            last = Some(id);
            // periodically drop an earlier node
            if v % 7 == 3 {
                let (victim, _) = ids.remove(ids.len() / 2);
                tree.remove(victim);
                if Some(victim) == last {
                    last = ids.last().map(|(id, _)| *id);
                }
                check_invariants(&tree);
            }
        }
        let expected: Vec<i32> = {
            let mut v: Vec<i32> = ids.iter().map(|(_, v)| *v).collect();
            v.sort();
            v
        };
        assert_eq!(in_order(&tree), expected);
    }
}
