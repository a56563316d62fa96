//! Shared fixtures for integration tests.

use std::path::{Path, PathBuf};

/// Header, separator, one valid row and one row missing fields.
pub const TWO_ROW_TABLE: &str = "\
# 豆瓣音乐 Top 25

| 序号 | 歌曲名 | 表演者 | 发行时间 | 流派 | 专辑类型 | 介质 | 评分 |
|------|--------|--------|----------|------|----------|------|------|
| 1 | Hey Jude! / 嘿 朱迪 | The Beatles | 1968-08-26 | Rock | 单曲 | 黑胶 | 9.5 |
| 2 | 残缺的行 | 无名 | 2001 |
";

/// Write `content` as `top.md` under `dir` and return its path.
pub fn write_table(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("top.md");
    std::fs::write(&path, content).expect("write table fixture");
    path
}

/// Markdown files in `dir`, sorted by name.
pub fn markdown_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.extension().map(|x| x == "md").unwrap_or(false))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}
