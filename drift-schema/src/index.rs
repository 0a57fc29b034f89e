use serde::{Deserialize, Serialize};

/// The index backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexType {
    Btree,
    Hash,
    Search,
    Mtree,
    Hnsw,
}

/// Vector distance metric used by `MTREE`/`HNSW` indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    Euclidean,
    Cosine,
    Manhattan,
    Hamming,
    Minkowski,
    Chebyshev,
    Jaccard,
    Pearson,
}

/// Optional BM25 tuning parameters on a `SEARCH` index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

/// An index on a table.
///
/// Indexes are compared as a whole: any difference forces a
/// drop-and-recreate rather than an in-place alter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
    pub index_type: IndexType,
    pub analyzer: Option<String>,
    pub highlights: bool,
    pub bm25: Option<Option<Bm25Params>>,
    pub dimension: Option<u32>,
    pub dist: Option<Distance>,
    pub capacity: Option<u32>,
    pub efc: Option<u32>,
    pub m: Option<u32>,
    pub m0: Option<u32>,
    pub lm: Option<f64>,
}

impl Index {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            unique: false,
            index_type: IndexType::Btree,
            analyzer: None,
            highlights: false,
            bm25: None,
            dimension: None,
            dist: None,
            capacity: None,
            efc: None,
            m: None,
            m0: None,
            lm: None,
        }
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn search(mut self, analyzer: impl Into<String>) -> Self {
        self.index_type = IndexType::Search;
        self.analyzer = Some(analyzer.into());
        self
    }

    pub fn highlights(mut self, highlights: bool) -> Self {
        self.highlights = highlights;
        self
    }

    pub fn bm25(mut self, params: Option<Bm25Params>) -> Self {
        self.index_type = IndexType::Search;
        self.bm25 = Some(params);
        self
    }

    pub fn mtree(mut self, dimension: u32, dist: Distance) -> Self {
        self.index_type = IndexType::Mtree;
        self.dimension = Some(dimension);
        self.dist = Some(dist);
        self
    }

    pub fn hnsw(mut self, dimension: u32, dist: Distance) -> Self {
        self.index_type = IndexType::Hnsw;
        self.dimension = Some(dimension);
        self.dist = Some(dist);
        self
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn efc(mut self, efc: u32) -> Self {
        self.efc = Some(efc);
        self
    }

    pub fn m(mut self, m: u32) -> Self {
        self.m = Some(m);
        self
    }

    pub fn m0(mut self, m0: u32) -> Self {
        self.m0 = Some(m0);
        self
    }

    pub fn lm(mut self, lm: f64) -> Self {
        self.lm = Some(lm);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_unique() {
        let idx = Index::new("email", vec!["email".into()]).unique(true);
        assert!(idx.unique);
        assert_eq!(idx.index_type, IndexType::Btree);
    }

    #[test]
    fn builder_sets_hnsw_params() {
        let idx = Index::new("embedding_idx", vec!["embedding".into()])
            .hnsw(384, Distance::Cosine)
            .efc(150)
            .m(12);
        assert_eq!(idx.index_type, IndexType::Hnsw);
        assert_eq!(idx.dimension, Some(384));
        assert_eq!(idx.efc, Some(150));
    }
}
