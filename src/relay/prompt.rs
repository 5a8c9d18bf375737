/// Section headings of the analysis, in the order the model must emit them.
pub const SECTIONS: [&str; 6] = [
    "Overview",
    "Past Performance",
    "Current Status",
    "Future Outlook",
    "Recommendation",
    "Confidence",
];

const SECTION_GUIDANCE: [&str; 6] = [
    "Type, sector, and short description.",
    "Key price trends (1Y, 5Y), % growth or decline, major events.",
    "Current price, market cap, P/E ratio (if stock), and recent updates.",
    "Expected direction with brief reasoning.",
    "Buy / Hold / Sell with short-term and long-term notes.",
    "% confidence in this advice.",
];

const CLOSING_LINE: &str = "\"Final Conclusion: You should *buy* it at around $90, with an estimated *90% chance of profit*.\"";

/// Builds the analysis prompt for an already-trimmed asset name.
pub fn build_prompt(asset_name: &str) -> String {
    let mut prompt = format!(
        "You are a professional financial analyst. Analyze the asset: \"{asset_name}\" \
         (company, stock, or cryptocurrency).\n\
         Use only verified public data and include numeric facts wherever possible.\n\n\
         Format your response as:\n"
    );

    for (i, (section, guidance)) in SECTIONS.iter().zip(SECTION_GUIDANCE).enumerate() {
        prompt.push_str(&format!("{}. {} – {}\n", i + 1, section, guidance));
    }

    prompt.push_str("\nEnd with:\n");
    prompt.push_str(CLOSING_LINE);
    prompt.push_str("\nKeep it factual, numeric, and concise.\n");

    prompt
}
