//! Static prompt catalog: prompt templates, action descriptors and the
//! two-level category menu.
//!
//! The catalog is built once at startup and shared read-only (`Arc<Catalog>`)
//! between the relay and the chat flow controller.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level query category. Each maps to one backend path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Clinical,
    Disease,
    Pharma,
}

impl Category {
    /// All categories in menu order.
    pub const ALL: [Category; 3] = [Category::Clinical, Category::Disease, Category::Pharma];

    /// Path segment used by the relay and the backend (`/clinical/...`).
    pub fn path_segment(&self) -> &'static str {
        match self {
            Category::Clinical => "clinical",
            Category::Disease => "disease",
            Category::Pharma => "pharma",
        }
    }

    /// Menu label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Clinical => "Clinical Data",
            Category::Disease => "Disease Symptoms",
            Category::Pharma => "Pharma",
        }
    }

    /// Parse a path segment (`clinical`, `disease`, `pharma`).
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.path_segment() == segment)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// One answer collected during a multi-step action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepField {
    /// Key the answer is stored under.
    pub name: String,
    /// Bot prompt asking for this field.
    pub prompt: String,
}

/// Replace `token` in the composition template with the answer stored under `field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub token: String,
    pub field: String,
}

/// Multi-step collection plan for an action.
///
/// `fields` is the collection order; `substitutions` is the order in which
/// the template tokens are replaced. The two are independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiStep {
    pub fields: Vec<StepField>,
    pub template: String,
    pub substitutions: Vec<Substitution>,
}

impl MultiStep {
    /// Number of answers to collect.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field collected at the 1-based `step`.
    pub fn field(&self, step: usize) -> Option<&StepField> {
        step.checked_sub(1).and_then(|i| self.fields.get(i))
    }

    /// Substitute the collected answers into the template.
    ///
    /// Each token is replaced once, verbatim, in substitution order. Returns
    /// `None` if an answer is missing.
    pub fn compose(&self, answers: &BTreeMap<String, String>) -> Option<String> {
        let mut prompt = self.template.clone();
        for sub in &self.substitutions {
            let value = answers.get(&sub.field)?;
            prompt = prompt.replacen(&sub.token, value, 1);
        }
        Some(prompt)
    }
}

/// An action the user can pick from a category menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub key: String,
    pub label: String,
    pub category: Category,
    pub multi_step: Option<MultiStep>,
}

impl ActionDescriptor {
    pub fn is_multi_step(&self) -> bool {
        self.multi_step.is_some()
    }
}

/// Immutable prompt templates, actions and menu.
#[derive(Debug, Clone)]
pub struct Catalog {
    templates: HashMap<String, String>,
    actions: HashMap<String, ActionDescriptor>,
    menu: Vec<(Category, Vec<String>)>,
}

impl Catalog {
    /// The built-in veterinary catalog.
    pub fn builtin() -> Self {
        let templates: HashMap<String, String> = TEMPLATES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut actions = HashMap::new();
        let mut menu = Vec::new();
        for (category, entries) in MENU {
            let mut keys = Vec::with_capacity(entries.len());
            for (key, label) in *entries {
                actions.insert(
                    key.to_string(),
                    ActionDescriptor {
                        key: key.to_string(),
                        label: label.to_string(),
                        category: *category,
                        multi_step: builtin_multi_step(key, &templates),
                    },
                );
                keys.push(key.to_string());
            }
            menu.push((*category, keys));
        }

        Self {
            templates,
            actions,
            menu,
        }
    }

    /// Prompt template for an exact keyword.
    pub fn template(&self, keyword: &str) -> Option<&str> {
        self.templates.get(keyword).map(String::as_str)
    }

    /// All `(keyword, template)` pairs, unordered.
    pub fn templates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.templates.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn action(&self, key: &str) -> Option<&ActionDescriptor> {
        self.actions.get(key)
    }

    /// Categories in menu order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.menu.iter().map(|(c, _)| *c)
    }

    /// Actions of a category in menu order.
    pub fn actions_for(&self, category: Category) -> Vec<&ActionDescriptor> {
        self.menu
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, keys)| keys.iter().filter_map(|k| self.actions.get(k)).collect())
            .unwrap_or_default()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const TEMPLATES: &[(&str, &str)] = &[
    ("synonym", "Return the disease synonyms for: "),
    ("diagnostic_workup", "Return the diagnostic workup for: "),
    ("drug_of_choice", "What is the drug of choice for: "),
    ("differential_diagnosis", "Return the differential diagnosis for: "),
    ("line_of_treatment", "Return the line of treatment for: "),
    ("prognosis", "Return the prognosis for: "),
    ("describe_clinical_signs", "Describe the clinical signs and symptoms for: "),
    ("symptoms", "Return the list of matched diseases for the symptoms: "),
    ("reverse_symptom_lookup", "Return the clinical signs and symptoms for disease: "),
    (
        "calculate_dose_rate",
        "Calculate the dose rate of {ingredient} in a {weight} {species}. ",
    ),
    ("indication", "Return the indications for the drug: "),
    ("contraindication", "Return the contraindications for the drug: "),
    ("mechanism_of_action", "Return the mechanism of action for the drug: "),
    (
        "metabolism_and_elimination",
        "Return the metabolism and elimination details for the drug: ",
    ),
    ("products", "Return the products for the drug: "),
];

const MENU: &[(Category, &[(&str, &str)])] = &[
    (
        Category::Clinical,
        &[
            ("synonym", "Synonym"),
            ("diagnostic_workup", "Diagnostic Workup"),
            ("drug_of_choice", "Drug of Choice"),
            ("differential_diagnosis", "Differential Diagnosis"),
            ("line_of_treatment", "Line of Treatment"),
            ("prognosis", "Prognosis"),
        ],
    ),
    (
        Category::Disease,
        &[
            ("describe_clinical_signs", "Describe Clinical Signs and Symptoms"),
            ("symptoms", "Symptoms"),
            ("reverse_symptom_lookup", "Reverse Symptom Lookup"),
        ],
    ),
    (
        Category::Pharma,
        &[
            ("calculate_dose_rate", "Calculate Dose Rate"),
            ("indication", "Indication"),
            ("contraindication", "Contraindication"),
            ("mechanism_of_action", "Mechanism of Action"),
            ("metabolism_and_elimination", "Metabolism and Elimination"),
            ("products", "Products"),
        ],
    ),
];

fn field(name: &str, prompt: &str) -> StepField {
    StepField {
        name: name.to_string(),
        prompt: prompt.to_string(),
    }
}

fn sub(token: &str, field: &str) -> Substitution {
    Substitution {
        token: token.to_string(),
        field: field.to_string(),
    }
}

fn builtin_multi_step(key: &str, templates: &HashMap<String, String>) -> Option<MultiStep> {
    match key {
        "calculate_dose_rate" => Some(MultiStep {
            fields: vec![
                field("drugname", "Please enter the drug name:"),
                field("species", "Please enter the species:"),
                field("bodyweight", "Please enter the body weight:"),
            ],
            template: templates.get(key)?.clone(),
            substitutions: vec![
                sub("{ingredient}", "drugname"),
                sub("{weight}", "bodyweight"),
                sub("{species}", "species"),
            ],
        }),
        "mechanism_of_action" => Some(MultiStep {
            fields: vec![field("drug", "Please enter the drug name:")],
            template: "Return the mechanism of action for the drug {drug}".to_string(),
            substitutions: vec![sub("{drug}", "drug")],
        }),
        _ => None,
    }
}
