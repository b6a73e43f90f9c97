//! 將 soroban CLI 的原始輸出（日誌 + 內嵌 JSON，或錯誤訊息）歸類為型別化結果。
//!
//! 每次歸類都是無狀態的純函式呼叫，結果恰為 [`Normalized`] 的其中一種。

use crate::core::command::Verb;
use crate::domain::model::ProductDetails;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// 合約在找不到產品時回傳的錯誤名稱
pub const NOT_FOUND_SENTINEL: &str = "ProductNotFound";
/// 同一錯誤經 host 轉換後的錯誤碼字串
pub const NOT_FOUND_CODE: &str = "Error(Contract, #101)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Details(ProductDetails),
    NotFound { product_id: String },
    ParseError { raw: String },
    OpaqueSuccess(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonCandidate<'a> {
    Found(&'a str),
    None,
    Malformed,
}

/// 合約定義的錯誤碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractError {
    ProductAlreadyExists,
    ProductNotFound,
    NotAuthorized,
    Other(u32),
}

impl ContractError {
    pub fn from_code(code: u32) -> Self {
        match code {
            100 => ContractError::ProductAlreadyExists,
            101 => ContractError::ProductNotFound,
            102 => ContractError::NotAuthorized,
            other => ContractError::Other(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            ContractError::ProductAlreadyExists => 100,
            ContractError::ProductNotFound => 101,
            ContractError::NotAuthorized => 102,
            ContractError::Other(code) => *code,
        }
    }
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::ProductAlreadyExists => write!(f, "ProductAlreadyExists (#100)"),
            ContractError::ProductNotFound => write!(f, "ProductNotFound (#101)"),
            ContractError::NotAuthorized => write!(f, "NotAuthorized (#102)"),
            ContractError::Other(code) => write!(f, "contract error #{}", code),
        }
    }
}

fn contract_error_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Error\(Contract,\s*#(\d+)\)").expect("contract error pattern is valid")
    })
}

/// 從文字中找出第一個 `Error(Contract, #N)`
pub fn contract_error_code(text: &str) -> Option<ContractError> {
    contract_error_pattern()
        .captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map(ContractError::from_code)
}

pub fn classify_not_found(text: &str) -> bool {
    text.contains(NOT_FOUND_SENTINEL) || text.contains(NOT_FOUND_CODE)
}

/// 找出第一個能解析為 JSON 物件、括號平衡的頂層 `{...}`
///
/// 會略過字串常值中的括號與跳脫字元。未閉合或解析失敗的片段會被跳過，
/// 從下一個 `{` 繼續找；完全沒有 `{` 時回傳 `None`，有 `{` 卻找不到合法物件時回傳 `Malformed`。
/// 每個 `{` 都可能往後掃到結尾，最壞情況對輸入長度為平方成本；CLI 輸出通常只有數 KB。
pub fn extract_json_object(text: &str) -> JsonCandidate<'_> {
    let bytes = text.as_bytes();
    let mut saw_open = false;
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        saw_open = true;
        let start = search_from + offset;

        match balanced_end(bytes, start) {
            Some(end) => {
                let candidate = &text[start..=end];
                if serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(candidate)
                    .is_ok()
                {
                    return JsonCandidate::Found(candidate);
                }
                search_from = start + 1;
            }
            None => search_from = start + 1,
        }
    }

    if saw_open {
        JsonCandidate::Malformed
    } else {
        JsonCandidate::None
    }
}

/// 回傳與 `start` 位置的 `{` 配對的 `}` 索引
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// 舊行為：第一個 `{` 到最後一個 `}`
///
/// 只保留為獨立的工具函式，`normalize` 不再使用：這個片段若能解析成 JSON 物件，
/// 從同一個 `{` 開始的平衡掃描早已找到它。
pub fn legacy_brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn classify_unparsed(text: &str, product_id: &str) -> Normalized {
    if classify_not_found(text) {
        Normalized::NotFound {
            product_id: product_id.to_string(),
        }
    } else {
        Normalized::ParseError {
            raw: text.to_string(),
        }
    }
}

/// 歸類成功結束（exit 0）的 CLI 輸出
pub fn normalize(verb: Verb, text: &str, product_id: &str) -> Normalized {
    if verb.is_write() {
        return Normalized::OpaqueSuccess(text.to_string());
    }

    let json = match extract_json_object(text) {
        JsonCandidate::Found(json) => json,
        JsonCandidate::None | JsonCandidate::Malformed => {
            return classify_unparsed(text, product_id)
        }
    };

    match serde_json::from_str::<ProductDetails>(json) {
        Ok(details) => Normalized::Details(details),
        Err(e) => {
            // 找不到產品時 CLI 也可能印出其他 JSON 事件資料，標記優先
            tracing::debug!("CLI JSON did not match product details: {}", e);
            classify_unparsed(text, product_id)
        }
    }
}

/// 歸類失敗（exit 非 0）的 CLI 輸出；只有讀取路徑會判定為 NotFound
pub fn normalize_failure(verb: Verb, stdout: &str, stderr: &str, product_id: &str) -> Option<Normalized> {
    if verb.is_write() {
        return None;
    }
    (classify_not_found(stderr) || classify_not_found(stdout)).then(|| Normalized::NotFound {
        product_id: product_id.to_string(),
    })
}
