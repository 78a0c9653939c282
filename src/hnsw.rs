use hnsw_rs::prelude::*;

/// 基于 HNSW 的内存向量索引
///
/// 插入顺序即为 HNSW 内部的点 ID，通过 `ids` 映射回文档 ID。
/// 索引只存在于内存中，进程退出后丢失。
pub struct CaptionIndex {
    index: Hnsw<'static, f32, DistCosine>,
    ids: Vec<String>,
}

impl CaptionIndex {
    pub fn new() -> Self {
        let index = Hnsw::<f32, _>::new(32, 100_000, 16, 128, DistCosine {});
        Self { index, ids: vec![] }
    }

    pub fn ntotal(&self) -> usize {
        self.index.get_nb_point()
    }

    /// 插入文档的嵌入向量
    pub fn add(&mut self, id: String, vector: &[f32]) {
        self.index.insert((vector, self.ids.len()));
        self.ids.push(id);
    }

    /// 搜索 k 个最近邻，返回 (文档 ID, 相似度)，相似度从高到低排列
    pub fn search(&self, vector: &[f32], k: usize, ef_search: usize) -> Vec<(String, f32)> {
        self.index
            .search(vector, k, ef_search)
            .into_iter()
            .map(|n| (self.ids[n.d_id].clone(), 1. - n.distance))
            .collect()
    }
}

impl Default for CaptionIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_empty() {
        let index = CaptionIndex::new();
        assert_eq!(index.ntotal(), 0);
        assert!(index.search(&[1., 0., 0.], 1, 16).is_empty());
    }

    #[test]
    fn search_orders_by_similarity() {
        let mut index = CaptionIndex::new();
        index.add("a".to_string(), &[1., 0., 0.]);
        index.add("b".to_string(), &[0., 1., 0.]);
        index.add("c".to_string(), &[0.9, 0.1, 0.]);

        let result = index.search(&[1., 0., 0.], 2, 16);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].0, "a");
        assert_eq!(result[1].0, "c");
        assert!(result[0].1 >= result[1].1);
    }

    #[test]
    fn search_truncates_to_k() {
        let mut index = CaptionIndex::new();
        for i in 0..10 {
            index.add(format!("doc{i}"), &[i as f32, 1., 0.]);
        }
        assert_eq!(index.search(&[1., 1., 0.], 3, 16).len(), 3);
    }
}
