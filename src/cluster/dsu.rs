//! Union-find (disjoint set union) over point indices.

/// Union-find with union by rank and iterative path compression.
///
/// `find` loops to the root and then compresses in a second pass, so deep
/// trees on large point sets cannot overflow the stack. Subtree sizes are
/// tracked at the roots for O(1) size queries. The structure is built once
/// per clustering invocation and discarded afterwards.
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
    size: Vec<usize>,
}

impl UnionFind {
    /// Creates `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            size: vec![1; n],
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// True when the structure holds no elements.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Returns the root of the set containing `x`, compressing the path.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Merges the sets containing `x` and `y` by rank.
    ///
    /// Returns false when they were already in the same set. On an equal-rank
    /// tie the second root attaches under the first and the first's rank
    /// increments.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }
        if self.rank[root_x] < self.rank[root_y] {
            self.parent[root_x] = root_y;
            self.size[root_y] += self.size[root_x];
        } else if self.rank[root_x] > self.rank[root_y] {
            self.parent[root_y] = root_x;
            self.size[root_x] += self.size[root_y];
        } else {
            self.parent[root_y] = root_x;
            self.size[root_x] += self.size[root_y];
            self.rank[root_x] += 1;
        }
        true
    }

    /// Size of the set containing `x`.
    pub fn get_size(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }

    /// Extracts all connected components as index lists.
    ///
    /// Components appear in order of their smallest element; element order
    /// within a component is ascending.
    pub fn components(&mut self) -> Vec<Vec<usize>> {
        let n = self.len();
        let mut by_root: std::collections::HashMap<usize, Vec<usize>> =
            std::collections::HashMap::new();
        let mut order: Vec<usize> = Vec::new();
        for i in 0..n {
            let root = self.find(i);
            let entry = by_root.entry(root).or_insert_with(|| {
                order.push(root);
                Vec::new()
            });
            entry.push(i);
        }
        order
            .into_iter()
            .map(|root| by_root.remove(&root).expect("root recorded"))
            .collect()
    }
}
