/// Allergies offered as pick-list entries when building a profile
pub const SUGGESTED_ALLERGIES: &[&str] = &[
    "Peanuts", "Dust", "Pollen", "Gluten", "Dairy", "Eggs", "Fish", "Shellfish",
    "Soy", "Wheat", "Tree Nuts", "Corn", "Sesame", "Mustard", "Sulfites",
    "Nightshades", "Legumes", "Citrus", "Bananas", "Chocolate", "Alcohol",
    "Histamine", "Salicylates", "Mushrooms", "Lactose",
];

/// Health conditions offered as pick-list entries when building a profile
pub const SUGGESTED_HEALTH_CONDITIONS: &[&str] = &[
    "Diabetes", "Hypertension", "Asthma", "Thyroid", "Celiac Disease",
    "Kidney Disease", "Gout", "Lactose Intolerance", "IBS", "Histamine Intolerance",
    "Alpha-gal Syndrome", "Hypersensitivity", "Oral Allergy Syndrome",
    "Shellfish Allergy", "Fish Allergy", "Gluten Sensitivity", "Insulin Resistance",
    "Autoimmune Diseases", "Heart Disease", "High Cholesterol",
];
