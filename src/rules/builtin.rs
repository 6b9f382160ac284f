// Built-in trade compliance rules
use crate::errors::Result;
use crate::rules::RuleSet;

/// Default rule table used when no rule file is configured
pub const BUILTIN_RULES: &str = r#"
[[rule]]
name = "base-commercial"
documents = ["Commercial Invoice", "Packing List"]
reason = "Required for every international shipment (customs valuation and contents)"

[[rule]]
name = "sea-freight"
documents = ["Bill of Lading"]
reason = "Ocean shipments travel under a bill of lading"
when = { mode_of_transport = ["sea", "ocean", "maritime"] }

[[rule]]
name = "air-freight"
documents = ["Air Waybill"]
reason = "Air shipments travel under an air waybill"
when = { mode_of_transport = ["air"] }

[[rule]]
name = "road-freight"
documents = ["CMR Consignment Note"]
reason = "Road shipments travel under a CMR consignment note"
when = { mode_of_transport = ["road", "truck"] }

[[rule]]
name = "us-origin"
documents = ["Certificate of Origin"]
reason = "Goods of United States origin need proof of origin for preferential treatment"
when = { origin_country = ["US", "USA", "United States"] }

[[rule]]
name = "export-declaration"
documents = ["Shipper's Export Declaration"]
reason = "HTS-flagged goods require an electronic export declaration"
when = { hts_flag = true }

[[rule]]
name = "pharmaceuticals"
documents = ["GMP Certificate", "Import Permit"]
reason = "Pharmaceutical products require GMP certification and an import permit"
when = { keywords = ["pharma", "medicine", "drug"] }

[[rule]]
name = "pharmaceuticals-hs"
documents = ["GMP Certificate", "Import Permit"]
reason = "HS chapter 30 covers pharmaceutical products"
when = { hs_prefix = ["30"] }

[[rule]]
name = "live-animals"
documents = ["Veterinary Health Certificate", "Import Permit"]
reason = "Live animals require veterinary certification and an import permit"
when = { keywords = ["live animal", "livestock"] }

[[rule]]
name = "live-animals-hs"
documents = ["Veterinary Health Certificate", "Import Permit"]
reason = "HS chapter 01 covers live animals"
when = { hs_prefix = ["01"] }

[[rule]]
name = "food"
documents = ["Phytosanitary Certificate"]
reason = "Food and agricultural products require plant/food safety certification"
when = { keywords = ["food", "fruit", "vegetable", "grain", "agricultur"] }

[[rule]]
name = "chemicals"
documents = ["Safety Data Sheet"]
reason = "Chemical products must ship with a safety data sheet"
when = { keywords = ["chemical", "hazardous", "flammable"] }

[[rule]]
name = "electronics-us"
documents = ["FCC Declaration"]
reason = "Radio-frequency electronics imported into the US need FCC conformity"
when = { keywords = ["electronic"], destination_country = ["US", "USA", "United States"] }

[[rule]]
name = "textiles"
documents = ["Textile Declaration"]
reason = "Textile and apparel imports require a textile declaration"
when = { keywords = ["textile", "apparel", "garment", "clothing"] }

[[rule]]
name = "machinery"
documents = ["Safety Certificate", "Technical Specifications"]
reason = "Industrial machinery requires safety certification and technical specifications"
when = { keywords = ["machinery", "cnc"] }
"#;

/// Parse the built-in rule table
pub fn builtin_rules() -> Result<RuleSet> {
    RuleSet::from_toml_str(BUILTIN_RULES)
}
