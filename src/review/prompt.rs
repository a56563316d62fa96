//! Prompt template and the simulation-mode placeholder review.

use crate::catalog::MusicEntry;

/// Build the review prompt for one entry.
pub fn build_prompt(entry: &MusicEntry) -> String {
    format!(
        "请你为以下音乐作品写一篇300-500字的乐评，适合在小红书上发表。

音乐信息:
歌曲名: {title}
表演者: {performer}
发行时间: {release_time}
流派: {genre}
专辑类型: {album_type}
介质: {medium}
评分: {rating}

要求:
1. 乐评要有感染力，文笔优美，情感真挚
2. 分析一下这首歌的艺术特点、表演水准和音乐语言
3. 提及这首歌的文化背景和历史意义
4. 总结这首歌的经典之处和个人感受
5. 字数保持在300-500字之间
6. 加入适合小红书风格的标题和2-3个话题标签",
        title = entry.title,
        performer = entry.performer,
        release_time = entry.release_time,
        genre = entry.genre,
        album_type = entry.album_type,
        medium = entry.medium,
        rating = entry.rating,
    )
}

/// Placeholder review used for dry runs; no service is contacted.
pub fn simulated_review(entry: &MusicEntry) -> String {
    let hashtag = entry.genre.split_whitespace().collect::<String>();
    format!(
        "【模拟乐评】{title}：{genre}里的时光回响

这是一篇为《{title}》生成的占位乐评，用于在没有 API 密钥时演练完整流程。\
{performer}在{release_time}发行的这张{album_type}以{medium}形式流传，\
豆瓣评分 {rating}。正式运行时，这里会是一段 300-500 字、围绕{genre}风格、\
演唱表现与时代背景展开的小红书风格乐评。

#{hashtag} #乐评 #音乐推荐",
        title = entry.title,
        genre = entry.genre,
        performer = entry.performer,
        release_time = entry.release_time,
        album_type = entry.album_type,
        medium = entry.medium,
        rating = entry.rating,
        hashtag = if hashtag.is_empty() { "音乐" } else { hashtag.as_str() },
    )
}
