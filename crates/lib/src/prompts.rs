//! # Default Prompts

/// Instructs the model to describe a product image as a single JSON object.
pub const PRODUCT_EXTRACTION_PROMPT: &str = r#"Analyze this product image and extract the following information in JSON format:
- product_name: The name of the product
- brand: The brand or manufacturer
- category: Product category
- specifications: Any technical specifications, features, or details visible
- confidence_score: Your confidence in the extraction (0-1)

Return only valid JSON without any additional text or markdown formatting."#;
