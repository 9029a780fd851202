//! Human-readable messages for validation keys
//!
//! Message text lives in immutable per-locale catalogs. A [`MessageProvider`]
//! is built explicitly by whoever renders output and passed where needed.

use lazy_static::lazy_static;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use crate::core::entry::{Severity, ValidationKey, Warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "ja" | "japanese" => Ok(Locale::Ja),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

struct Template {
    message: &'static str,
    description: &'static str,
}

macro_rules! catalog {
    ($($key:ident => ($message:expr, $description:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert(
                ValidationKey::$key,
                Template { message: $message, description: $description },
            );
        )*
        map
    }};
}

lazy_static! {
    static ref EN_MESSAGES: HashMap<ValidationKey, Template> = catalog! {
        MissingFields => (
            "Line is missing required fields",
            "Each record needs at least a domain, an account id and a relationship."
        ),
        InvalidFormat => (
            "Line is not in ads.txt format",
            "Record fields must be separated by commas."
        ),
        InvalidRelationship => (
            "Relationship must be DIRECT or RESELLER",
            "The third field declares the relationship and must be DIRECT or RESELLER."
        ),
        InvalidDomain => (
            "Invalid advertising system domain",
            "The first field must be a registrable domain under a known public suffix."
        ),
        EmptyAccountId => (
            "Account id is empty",
            "The second field must contain the publisher's account id."
        ),
        InvalidCharacters => (
            "Line contains control characters",
            "Remove control characters from the line."
        ),
        EmptyFile => (
            "ads.txt is empty",
            "The file contains no records or variables."
        ),
        ImplimentedEntry => (
            "Entry is already present in the ads.txt of {{domain}}",
            "This record duplicates one in the currently published ads.txt."
        ),
        NoSellersJson => (
            "No sellers.json found for {{domain}}",
            "The advertising system does not publish a sellers.json file."
        ),
        DirectAccountIdNotInSellersJson => (
            "DIRECT account {{account_id}} not found in sellers.json of {{domain}}",
            "The account id of a DIRECT record must be listed in the advertising system's sellers.json."
        ),
        ResellerAccountIdNotInSellersJson => (
            "RESELLER account {{account_id}} not found in sellers.json of {{domain}}",
            "The account id of a RESELLER record must be listed in the advertising system's sellers.json."
        ),
        DomainMismatch => (
            "Seller domain {{seller_domain}} for account {{account_id}} does not match {{publisher_domain}}",
            "The sellers.json domain should match the publisher domain or a declared OWNERDOMAIN/MANAGERDOMAIN."
        ),
        DirectNotPublisher => (
            "DIRECT account {{account_id}} on {{domain}} has seller_type {{seller_type}}",
            "A DIRECT seller should be of type PUBLISHER or BOTH."
        ),
        SellerIdNotUnique => (
            "Seller id {{account_id}} appears more than once in sellers.json of {{domain}}",
            "Seller ids must be unique within a sellers.json file."
        ),
        ResellerNotIntermediary => (
            "RESELLER account {{account_id}} on {{domain}} has seller_type {{seller_type}}",
            "A RESELLER seller should be of type INTERMEDIARY or BOTH."
        ),
        SellersJsonValidationError => (
            "Could not check sellers.json of {{domain}}: {{message}}",
            "Seller data could not be loaded or evaluated for this record."
        ),
    };

    static ref JA_MESSAGES: HashMap<ValidationKey, Template> = catalog! {
        MissingFields => (
            "必須フィールドが不足しています",
            "各レコードにはドメイン、アカウントID、関係の3項目が必要です。"
        ),
        InvalidFormat => (
            "ads.txt の形式ではありません",
            "レコードの各フィールドはカンマで区切る必要があります。"
        ),
        InvalidRelationship => (
            "関係は DIRECT または RESELLER である必要があります",
            "3番目のフィールドには DIRECT または RESELLER を指定してください。"
        ),
        InvalidDomain => (
            "広告システムのドメインが無効です",
            "1番目のフィールドは既知のパブリックサフィックス配下のドメインである必要があります。"
        ),
        EmptyAccountId => (
            "アカウントIDが空です",
            "2番目のフィールドにはパブリッシャーのアカウントIDが必要です。"
        ),
        InvalidCharacters => (
            "制御文字が含まれています",
            "行から制御文字を削除してください。"
        ),
        EmptyFile => (
            "ads.txt が空です",
            "ファイルにレコードも変数も含まれていません。"
        ),
        ImplimentedEntry => (
            "このエントリは {{domain}} の ads.txt に既に存在します",
            "現在公開されている ads.txt のレコードと重複しています。"
        ),
        NoSellersJson => (
            "{{domain}} の sellers.json が見つかりません",
            "広告システムが sellers.json を公開していません。"
        ),
        DirectAccountIdNotInSellersJson => (
            "DIRECT アカウント {{account_id}} が {{domain}} の sellers.json にありません",
            "DIRECT レコードのアカウントIDは広告システムの sellers.json に記載されている必要があります。"
        ),
        ResellerAccountIdNotInSellersJson => (
            "RESELLER アカウント {{account_id}} が {{domain}} の sellers.json にありません",
            "RESELLER レコードのアカウントIDは広告システムの sellers.json に記載されている必要があります。"
        ),
        DomainMismatch => (
            "アカウント {{account_id}} の販売者ドメイン {{seller_domain}} が {{publisher_domain}} と一致しません",
            "sellers.json のドメインはパブリッシャーのドメイン、または宣言された OWNERDOMAIN/MANAGERDOMAIN と一致する必要があります。"
        ),
        DirectNotPublisher => (
            "{{domain}} の DIRECT アカウント {{account_id}} の seller_type が {{seller_type}} です",
            "DIRECT の販売者は PUBLISHER または BOTH である必要があります。"
        ),
        SellerIdNotUnique => (
            "販売者ID {{account_id}} が {{domain}} の sellers.json に複数回出現します",
            "sellers.json 内の販売者IDは一意である必要があります。"
        ),
        ResellerNotIntermediary => (
            "{{domain}} の RESELLER アカウント {{account_id}} の seller_type が {{seller_type}} です",
            "RESELLER の販売者は INTERMEDIARY または BOTH である必要があります。"
        ),
        SellersJsonValidationError => (
            "{{domain}} の sellers.json を確認できませんでした: {{message}}",
            "このレコードの販売者データを読み込めませんでした。"
        ),
    };
}

/// A rendered message for one validation key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    pub key: ValidationKey,
    pub severity: Severity,
    pub message: String,
    pub description: String,
    pub help_url: Option<String>,
}

/// Renders validation keys in one locale
#[derive(Debug, Clone, Default)]
pub struct MessageProvider {
    locale: Locale,
    help_base_url: Option<String>,
}

impl MessageProvider {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            help_base_url: None,
        }
    }

    /// Link each message to `<base_url>?key=<validation key>`
    pub fn with_help_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.help_base_url = Some(base_url.into());
        self
    }

    pub fn format(&self, key: ValidationKey, params: &BTreeMap<String, String>) -> ValidationMessage {
        let catalog: &HashMap<ValidationKey, Template> = match self.locale {
            Locale::En => &*EN_MESSAGES,
            Locale::Ja => &*JA_MESSAGES,
        };

        let (message, description) = match catalog.get(&key).or_else(|| EN_MESSAGES.get(&key)) {
            Some(template) => (
                fill_placeholders(template.message, params),
                fill_placeholders(template.description, params),
            ),
            None => (key.as_str().to_string(), String::new()),
        };

        ValidationMessage {
            key,
            severity: key.default_severity(),
            message,
            description,
            help_url: self
                .help_base_url
                .as_ref()
                .map(|base| format!("{}?key={}", base.trim_end_matches('/'), key)),
        }
    }

    pub fn format_warning(&self, warning: &Warning) -> ValidationMessage {
        let mut rendered = self.format(warning.key, &warning.params);
        rendered.severity = warning.severity;
        rendered
    }
}

/// Replace `{{name}}` with `params[name]`; unknown placeholders stay as written
fn fill_placeholders(template: &str, params: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match params.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_every_key_has_messages_in_both_locales() {
        for key in ValidationKey::ALL {
            assert!(EN_MESSAGES.contains_key(&key), "missing en message for {key}");
            assert!(JA_MESSAGES.contains_key(&key), "missing ja message for {key}");
        }
    }

    #[test]
    fn test_placeholders_are_filled() {
        let provider = MessageProvider::new(Locale::En);
        let rendered = provider.format(ValidationKey::NoSellersJson, &params(&[("domain", "openx.com")]));
        assert_eq!(rendered.message, "No sellers.json found for openx.com");
        assert_eq!(rendered.severity, Severity::Warning);
        assert_eq!(rendered.help_url, None);
    }

    #[test]
    fn test_unknown_placeholder_left_in_place() {
        assert_eq!(fill_placeholders("a {{x}} b {{y}}", &params(&[("y", "2")])), "a {{x}} b 2");
        assert_eq!(fill_placeholders("dangling {{x", &params(&[])), "dangling {{x");
    }

    #[test]
    fn test_japanese_and_help_url() {
        let provider = MessageProvider::new("ja".parse().unwrap())
            .with_help_base_url("https://help.example.com/ads-txt/");
        let rendered = provider.format(ValidationKey::EmptyFile, &BTreeMap::new());
        assert_eq!(rendered.message, "ads.txt が空です");
        assert_eq!(
            rendered.help_url.as_deref(),
            Some("https://help.example.com/ads-txt?key=emptyFile")
        );
    }
}
