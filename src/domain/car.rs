use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::CarId;

/// 車両の自由形式属性（model, price, image など）
pub type CarAttributes = Map<String, Value>;

/// 検索対象となる属性キー
pub const MODEL_FIELD: &str = "model";

/// 所有者のメールアドレスを保持する属性キー
pub const OWNER_EMAIL_FIELD: &str = "ownerEmail";

/// サーバー側で管理するキー。クライアントからの値は無視する。
const RESERVED_FIELDS: [&str; 3] = ["_id", "demandCount", "createdAt"];

/// 車両レコード
///
/// 属性は自由形式。demand_count は予約成立ごとに1ずつ増える人気カウンタで、
/// 減ることはない。
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub car_id: CarId,
    pub attributes: CarAttributes,
    pub demand_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Car {
    /// model 属性（文字列でなければ None）
    pub fn model(&self) -> Option<&str> {
        self.attributes.get(MODEL_FIELD).and_then(Value::as_str)
    }

    /// 所有者メールアドレス（文字列でなければ None）
    pub fn owner_email(&self) -> Option<&str> {
        self.attributes.get(OWNER_EMAIL_FIELD).and_then(Value::as_str)
    }

    /// 検索語に一致するか（大文字小文字を区別しない部分一致）
    ///
    /// 空白のみの検索語はすべての車両に一致する。
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        self.model()
            .is_some_and(|model| model.to_lowercase().contains(&term.to_lowercase()))
    }
}

/// 純粋関数：車両を登録する
///
/// demand_count は0から開始。予約済みキーは属性から取り除く。
pub fn add_car(attributes: CarAttributes, now: DateTime<Utc>) -> Car {
    Car {
        car_id: CarId::new(),
        attributes: sanitize_attributes(attributes),
        demand_count: 0,
        created_at: now,
    }
}

/// サーバー管理キーを取り除いた属性を返す
pub fn sanitize_attributes(mut attributes: CarAttributes) -> CarAttributes {
    for key in RESERVED_FIELDS {
        attributes.remove(key);
    }
    attributes
}

/// 既存属性に部分属性をマージする（キー単位の上書き）
///
/// 値が変化した場合 true を返す。
pub fn merge_attributes(target: &mut CarAttributes, patch: CarAttributes) -> bool {
    let mut modified = false;
    for (key, value) in patch {
        if target.get(&key) != Some(&value) {
            target.insert(key, value);
            modified = true;
        }
    }
    modified
}

/// 所有者の車両一覧の並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerCarOrder {
    /// 登録日時の新しい順
    #[default]
    Newest,
    /// 登録日時の古い順
    Oldest,
}

impl std::str::FromStr for OwnerCarOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" | "dsc" | "desc" => Ok(OwnerCarOrder::Newest),
            "oldest" | "asc" => Ok(OwnerCarOrder::Oldest),
            _ => Err(format!("Invalid filterDate: {}", s)),
        }
    }
}
