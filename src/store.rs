use std::path::PathBuf;

use anyhow::Result;

/// 图片文件存储，以文件名为键保存上传的图片
///
/// 文件名冲突时直接覆盖旧文件，不做任何内容校验
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// 保存图片到存储目录，返回保存后的路径
    pub async fn save(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(filename);
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }

    /// 返回文件名对应的存储路径
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_overwrite() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ImageStore::new(dir.path().join("images"));

        let path = store.save("cat.jpg", b"old").await?;
        assert_eq!(path, store.path_for("cat.jpg"));
        assert_eq!(tokio::fs::read(&path).await?, b"old");

        store.save("cat.jpg", b"new").await?;
        assert_eq!(tokio::fs::read(&path).await?, b"new");

        Ok(())
    }
}
