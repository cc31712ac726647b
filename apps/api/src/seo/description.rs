//! Description generation — fills the fixed template and asks the oracle for prose.

use crate::models::item::ItemFeatures;
use crate::models::seo::KeywordSet;
use crate::oracle::{GenerationOracle, OracleError};
use crate::seo::prompts::{description_prompt, DESCRIPTION_KEYWORD_COUNT, DESCRIPTION_PARAMS};

/// The four fields the description prompt embeds, already rendered to text.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionContext {
    pub title: String,
    pub price: String,
    pub condition: String,
    pub keywords: String,
}

impl DescriptionContext {
    pub fn new(item: &ItemFeatures, keywords: &KeywordSet) -> Self {
        Self {
            title: item.title.clone(),
            price: ItemFeatures::render(&item.price),
            condition: ItemFeatures::render(&item.condition),
            keywords: keywords.top(DESCRIPTION_KEYWORD_COUNT).join(", "),
        }
    }

    /// Every line is always present, even when its value is empty.
    pub fn to_prompt(&self) -> String {
        description_prompt(&self.title, &self.price, &self.condition, &self.keywords)
    }
}

/// Returns the oracle text verbatim; no trimming. `SeoPipeline` maps an `Err` to `""`.
pub async fn generate_description(
    item: &ItemFeatures,
    keywords: &KeywordSet,
    oracle: &dyn GenerationOracle,
) -> Result<String, OracleError> {
    let prompt = DescriptionContext::new(item, keywords).to_prompt();
    oracle.generate(&prompt, &DESCRIPTION_PARAMS).await
}
