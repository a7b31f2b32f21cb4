// ==========================================
// 二手车挂牌数据入库 - 重复主键检测
// ==========================================
// 职责: 检测同一数据源内重复的 listing_id
// 策略: 保留首次出现的行，其余视为重复
// ==========================================

use std::collections::HashMap;

pub struct ConflictHandler;

impl ConflictHandler {
    /// 检测重复主键
    ///
    /// # 参数
    /// - keys: 按源顺序排列的主键（None 表示主键缺失，不参与判重）
    ///
    /// # 返回
    /// - Vec<(行位置, listing_id)>: 重复记录列表（不包括第一次出现）
    pub fn detect_duplicates(&self, keys: &[Option<i64>]) -> Vec<(usize, i64)> {
        let mut first_occurrence: HashMap<i64, usize> = HashMap::new();
        let mut duplicates = Vec::new();

        for (position, key) in keys.iter().enumerate() {
            if let Some(listing_id) = key {
                if first_occurrence.contains_key(listing_id) {
                    duplicates.push((position, *listing_id));
                } else {
                    first_occurrence.insert(*listing_id, position);
                }
            }
        }

        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_duplicates_none() {
        let handler = ConflictHandler;
        let duplicates = handler.detect_duplicates(&[Some(1), Some(2), None]);
        assert!(duplicates.is_empty());
    }

    #[test]
    fn test_detect_duplicates_keeps_first() {
        let handler = ConflictHandler;
        let duplicates = handler.detect_duplicates(&[Some(1), Some(2), Some(1), Some(1)]);

        assert_eq!(duplicates, vec![(2, 1), (3, 1)]);
    }

    #[test]
    fn test_missing_keys_are_not_duplicates() {
        let handler = ConflictHandler;
        let duplicates = handler.detect_duplicates(&[None, None, Some(5)]);
        assert!(duplicates.is_empty());
    }
}
