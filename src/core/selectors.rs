use crate::domain::model::SelectorTarget;

use SelectorTarget::{Attribute, Text, WholePage};

const AMAZON: &[SelectorTarget] = &[
    Text("#priceblock_ourprice"),
    Text("#priceblock_dealprice"),
    Text("#price_inside_buybox"),
    Text(".a-color-price"),
];

const FLIPKART: &[SelectorTarget] = &[Text("._30jeq3._16Jk6d"), Text("._1vC4OE")];

const STOREFRONT: &[SelectorTarget] = &[
    Text(".price"),
    Text(".product-price"),
    Text(".offer-price"),
    Attribute {
        css: "[itemprop=price]",
        attr: "content",
    },
    Text("[itemprop=price]"),
];

const GENERIC: &[SelectorTarget] = &[
    Attribute {
        css: "meta[itemprop='price']",
        attr: "content",
    },
    Text("[class*=price]"),
    Text("[id*=price]"),
    WholePage,
];

/// Domain fragment to site-specific candidates, checked top to bottom.
/// New vendors are added here.
const RULES: &[(&str, &[SelectorTarget])] = &[
    ("amazon.", AMAZON),
    ("flipkart.", FLIPKART),
    ("apple.", STOREFRONT),
    ("hp.", STOREFRONT),
];

/// Candidate price locations for `domain`, most specific first.
pub fn resolve_selectors(domain: &str) -> &'static [SelectorTarget] {
    let domain = domain.to_ascii_lowercase();
    RULES
        .iter()
        .find(|(fragment, _)| domain.contains(fragment))
        .map(|(_, selectors)| *selectors)
        .unwrap_or(GENERIC)
}
