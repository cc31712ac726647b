// All prompt constants and decoding parameters for the SEO pipeline.

use crate::oracle::GenerationParams;

/// Keyword prompt prefix. The aggregated feature text follows directly.
pub const KEYWORD_PROMPT_PREFIX: &str = "generate keywords: ";

/// Keyword generation: deterministic beam search, short output.
pub const KEYWORD_PARAMS: GenerationParams = GenerationParams::beam(50, 4);

/// Description prompt: four labeled lines, always in this order.
/// Built with `format!` so field values are never re-scanned for placeholders.
pub fn description_prompt(title: &str, price: &str, condition: &str, keywords: &str) -> String {
    format!(
        "Generate SEO description for: {title}\n\
         Price: {price}\n\
         Condition: {condition}\n\
         Keywords: {keywords}"
    )
}

/// Description generation: beam search with sampling temperature.
pub const DESCRIPTION_PARAMS: GenerationParams = GenerationParams::sampled(200, 4, 0.7);

/// How many keywords feed the description prompt.
pub const DESCRIPTION_KEYWORD_COUNT: usize = 5;
