use uuid::Uuid;

/// 挿入結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertResult {
    pub inserted_id: Uuid,
}

/// 更新結果
///
/// matched_count は条件に一致したレコード数、modified_count は
/// 実際に値が変化したレコード数。upsertで新規作成した場合は
/// upserted_id に新しいIDが入る。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Uuid>,
}

impl UpdateResult {
    /// 一致なし（対象が存在しない）
    pub fn unmatched() -> Self {
        Self::default()
    }

    /// 既存レコード1件に一致
    pub fn matched(modified: bool) -> Self {
        Self {
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_id: None,
        }
    }

    /// upsertによる新規作成
    pub fn upserted(id: Uuid) -> Self {
        Self {
            matched_count: 0,
            modified_count: 0,
            upserted_id: Some(id),
        }
    }
}

/// 削除結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}
