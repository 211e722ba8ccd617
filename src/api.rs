//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// 行レコードのキーの決め方
///
/// シートの各行をレコードに変換する際、どの値をキーとして使うかを指定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum HeaderMode {
    /// 最初の非空行をヘッダーとして使用（デフォルト）
    ///
    /// 以降の各行は `{ヘッダー: 値}` のオブジェクトになります。
    /// 空のヘッダーセルは `__EMPTY`、重複したヘッダーは `Name_1` のように
    /// 一意な名前に置き換えられます。
    ///
    /// # 出力例
    ///
    /// ```json
    /// {"Sheet1":[{"Name":"Alice","Age":30}]}
    /// ```
    #[default]
    FirstRow,

    /// 列記号（A, B, C, ...）をキーとして使用
    ///
    /// 最初の行もデータとして扱います。
    ///
    /// # 出力例
    ///
    /// ```json
    /// {"Sheet1":[{"A":"Name","B":"Age"},{"A":"Alice","B":30}]}
    /// ```
    ColumnLetters,

    /// 各行を値の配列として出力
    ///
    /// 最初の行もデータとして扱い、空セルは `null` になります。
    ///
    /// # 出力例
    ///
    /// ```json
    /// {"Sheet1":[["Name","Age"],["Alice",30]]}
    /// ```
    RowArrays,
}

/// 日付セルの出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum DateMode {
    /// Excelのシリアル値（数値）のまま出力（デフォルト）
    ///
    /// 例: `2025-11-20` → `45981`
    #[default]
    SerialNumber,

    /// ISO 8601形式の文字列
    ///
    /// 時刻成分がない場合は `YYYY-MM-DD`、ある場合は `YYYY-MM-DDTHH:MM:SS`。
    Iso8601,
}

/// JSON出力のスタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum OutputStyle {
    /// 空白なしの1行JSON（デフォルト）
    #[default]
    Compact,

    /// インデント付きJSON
    Pretty,
}

/// シート選択方式
///
/// 変換対象のシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SheetSelector {
    /// すべてのシートをワークブックの順序で変換（デフォルト）
    #[default]
    All,

    /// インデックス指定（0始まり）
    Index(usize),

    /// シート名指定
    Name(String),

    /// 複数のインデックス指定
    ///
    /// 例: `SheetSelector::Indices(vec![0, 2, 4])`
    Indices(Vec<usize>),

    /// 複数のシート名指定
    Names(Vec<String>),
}
