use std::collections::BTreeMap;

pub const DEFAULT_VERSION: &str = "clinical-v1";

const DEFAULT_TERMS: &[(&str, &[&str])] = &[
	("pneumonia", &["pulmonary", "lung", "respiratory", "infection", "ventilation", "ards"]),
	("diabetes", &["insulin", "glucose", "glycemic", "hba1c", "metformin", "hyperglycemia"]),
	("hypertension", &["blood", "pressure", "antihypertensive", "systolic", "diastolic"]),
	("cancer", &["tumor", "tumour", "oncology", "carcinoma", "malignancy", "neoplasm"]),
	("heart", &["cardiac", "cardiovascular", "myocardial", "coronary"]),
	("stroke", &["cerebrovascular", "ischemic", "thrombolysis", "hemorrhagic"]),
	("asthma", &["bronchial", "airway", "wheezing", "inhaler", "bronchodilator"]),
	("covid", &["sars", "coronavirus", "pandemic", "covid19"]),
	("sepsis", &["septic", "bacteremia", "infection", "shock"]),
	("depression", &["depressive", "antidepressant", "mood", "psychiatric"]),
	("kidney", &["renal", "nephropathy", "dialysis", "glomerular"]),
	("liver", &["hepatic", "cirrhosis", "hepatitis", "fibrosis"]),
	("obesity", &["overweight", "bmi", "adiposity", "bariatric"]),
	("infection", &["infectious", "bacterial", "viral", "antibiotic", "antimicrobial"]),
	("treatment", &["therapy", "therapeutic", "management", "intervention"]),
	("pain", &["analgesia", "analgesic", "opioid", "nociceptive"]),
];

/// The built-in clinical table used when the config file does not override `[synonyms]`.
pub fn default_terms() -> BTreeMap<String, Vec<String>> {
	DEFAULT_TERMS
		.iter()
		.map(|(key, terms)| {
			(key.to_string(), terms.iter().map(|term| term.to_string()).collect::<Vec<_>>())
		})
		.collect()
}
