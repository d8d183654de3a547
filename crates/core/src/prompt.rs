//! Prompt synthesis for the negotiation model.
//!
//! Everything here is a pure function of its inputs: the same prices and
//! sentiment always produce byte-identical text.

use rust_decimal::Decimal;

use crate::domain::sentiment::SentimentCategory;

/// Standing instruction sent with every negotiation request.
///
/// It asks the model to vary its phrasing between customers while the
/// generation settings pin temperature to zero; the two pull in opposite
/// directions and the sampling settings are left as they are.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an expert negotiator replying to a customer's price offer for a product. Each conversation gives you:

{price}: the original price of the product.
{user_price}: the price the customer offered.
{sentiment}: the customer's tone as judged by sentiment analysis (polite, neutral or negative).

Objectives:
1. Acknowledge both the original price and the customer's offer.
2. Adjust your counteroffer to the customer's sentiment:
   - Polite: lower the original price somewhat as a concession.
   - Neutral: propose a price between 80% and 90% of the original price when the offer is reasonable. When the offer is too low, explain politely but firmly why it cannot be accepted.
   - Negative: reject the low offer and propose a price close to the original, making clear the customer has to raise their offer.
3. When the offer is extremely low (for example under 30% of the original price), reject it firmly, explain why, and counter with a realistic price that is no more than 5% to 10% below the product price.
4. Suggest a compromise that can lead to agreement while keeping the final price within a reasonable range of market value.

Do not make unrealistic concessions toward the customer's budget; very low offers get only small movements.

5. Vary your responses:
   - Use different wording and counteroffer approaches depending on how far the offer is from the original price.
   - If the gap is large (more than 30% below the original), be firm and concede no more than 5-10%.
   - Keep prices flexible but realistic; the larger the gap between {user_price} and {price}, the firmer you are.
6. Respond differently for each customer:
   - Use phrases such as 'I appreciate your interest', 'Let's see if we can find some middle ground' or 'Unfortunately, I can't go that low'.
   - Vary counteroffers by percentage, for example 5-15% off for polite requests and a larger discount when the customer is especially positive.
";

pub fn build_prompt(
    product_price: Decimal,
    user_price: Decimal,
    sentiment: SentimentCategory,
) -> String {
    let product = dollars(product_price);
    let offer = dollars(user_price);

    match sentiment {
        SentimentCategory::Polite => format!(
            "The user was very polite and respectful in their request to offer {offer}. \
             They expressed interest in buying the product at {offer}. \
             Please respond in a polite manner by offering a small discount or other concessions."
        ),
        SentimentCategory::Neutral => format!(
            "The user made a neutral offer of {offer} for a product priced at {product}. \
             Please respond with a fair counteroffer, balancing the original price and the user's offer."
        ),
        SentimentCategory::Negative => format!(
            "The user was a bit negative in their request, offering {offer}, \
             which is significantly lower than the product price of {product}. \
             Respond firmly, signaling that the user needs to raise their offer for the deal to proceed."
        ),
    }
}

/// Structured first turn that primes the conversation with the raw inputs.
pub fn context_line(
    product_price: Decimal,
    user_price: Decimal,
    sentiment: SentimentCategory,
) -> String {
    format!(
        "price: {}\nuser_price: {}\nsentiment: \"{}\"",
        dollars(product_price),
        dollars(user_price),
        sentiment.as_str()
    )
}

fn dollars(amount: Decimal) -> String {
    format!("${}", amount.normalize())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{build_prompt, context_line, SYSTEM_INSTRUCTION};
    use crate::domain::sentiment::SentimentCategory;

    fn price(units: i64) -> Decimal {
        Decimal::new(units, 0)
    }

    #[test]
    fn neutral_template_interpolates_both_prices() {
        let prompt = build_prompt(price(100), price(80), SentimentCategory::Neutral);
        assert_eq!(
            prompt,
            "The user made a neutral offer of $80 for a product priced at $100. \
             Please respond with a fair counteroffer, balancing the original price and the user's offer."
        );
    }

    #[test]
    fn polite_template_mentions_offer_only() {
        let prompt = build_prompt(price(100), price(95), SentimentCategory::Polite);
        assert!(prompt.starts_with("The user was very polite"));
        assert_eq!(prompt.matches("$95").count(), 2);
        assert!(!prompt.contains("$100"));
    }

    #[test]
    fn negative_template_asks_for_firm_reply() {
        let prompt = build_prompt(price(100), price(20), SentimentCategory::Negative);
        assert!(prompt.contains("offering $20"));
        assert!(prompt.contains("product price of $100"));
        assert!(prompt.contains("Respond firmly"));
    }

    #[test]
    fn templates_differ_per_sentiment_and_repeat_exactly() {
        let prompts: Vec<String> = SentimentCategory::ALL
            .iter()
            .map(|sentiment| build_prompt(price(100), price(70), *sentiment))
            .collect();
        assert_ne!(prompts[0], prompts[1]);
        assert_ne!(prompts[1], prompts[2]);

        for (sentiment, first) in SentimentCategory::ALL.iter().zip(&prompts) {
            assert_eq!(&build_prompt(price(100), price(70), *sentiment), first);
        }
    }

    #[test]
    fn amounts_drop_trailing_zeros() {
        let prompt =
            build_prompt(Decimal::new(10000, 2), Decimal::new(7950, 2), SentimentCategory::Neutral);
        assert!(prompt.contains("offer of $79.5 for a product priced at $100."));
    }

    #[test]
    fn context_line_lists_inputs() {
        let line = context_line(price(100), price(80), SentimentCategory::Negative);
        assert_eq!(line, "price: $100\nuser_price: $80\nsentiment: \"negative\"");
    }

    #[test]
    fn system_instruction_covers_low_offer_floor() {
        assert!(SYSTEM_INSTRUCTION.contains("30%"));
        assert!(SYSTEM_INSTRUCTION.contains("5% to 10%"));
    }
}
