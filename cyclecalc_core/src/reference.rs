//! Static reference tables: fetal development, prenatal care, cycle phases.
//!
//! Tables are built once on first access and never mutated. Lookups are
//! total: weeks fall back to the nearest documented week, and unknown phase
//! names fall back to a generic descriptor.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

/// Cached reference data - built once and reused across all lookups
static REFERENCE: Lazy<ReferenceTables> = Lazy::new(build_reference_tables);

/// All static lookup tables
#[derive(Clone, Debug)]
pub struct ReferenceTables {
    pub fetal_development: BTreeMap<u32, FetalDevelopmentInfo>,
    pub prenatal_care: HashMap<Trimester, PrenatalCareInfo>,
    pub phases: HashMap<CyclePhase, PhaseDescriptor>,
    pub unknown_phase: PhaseDescriptor,
}

/// Get a reference to the cached tables
pub fn tables() -> &'static ReferenceTables {
    &REFERENCE
}

/// Fetal development for `week`, or the closest documented week
///
/// Ties resolve to the earlier week.
pub fn fetal_development(week: u32) -> &'static FetalDevelopmentInfo {
    tables().fetal_development_for(week)
}

/// Prenatal care guidance for a trimester
pub fn prenatal_care(trimester: Trimester) -> &'static PrenatalCareInfo {
    tables().prenatal_care_for(trimester)
}

/// Descriptor for a phase name such as "luteal" or "ovulatory"
pub fn describe_phase(name: &str) -> &'static PhaseDescriptor {
    tables().describe_phase(name)
}

impl ReferenceTables {
    pub fn fetal_development_for(&self, week: u32) -> &FetalDevelopmentInfo {
        if let Some(info) = self.fetal_development.get(&week) {
            return info;
        }

        // BTreeMap iterates ascending, so min_by_key keeps the lower week on ties
        let nearest = self
            .fetal_development
            .iter()
            .min_by_key(|(k, _)| k.abs_diff(week))
            .map(|(_, info)| info);

        match nearest {
            Some(info) => {
                tracing::debug!(
                    "No fetal development entry for week {}, using week {}",
                    week,
                    info.week
                );
                info
            }
            None => &*FALLBACK_DEVELOPMENT,
        }
    }

    pub fn prenatal_care_for(&self, trimester: Trimester) -> &PrenatalCareInfo {
        self.prenatal_care
            .get(&trimester)
            .unwrap_or(&*FALLBACK_CARE)
    }

    pub fn describe_phase(&self, name: &str) -> &PhaseDescriptor {
        match CyclePhase::parse(name).and_then(|p| self.phases.get(&p)) {
            Some(descriptor) => descriptor,
            None => {
                tracing::debug!("Unrecognised phase name '{}', using default text", name);
                &self.unknown_phase
            }
        }
    }

    pub fn phase(&self, phase: CyclePhase) -> &PhaseDescriptor {
        self.phases.get(&phase).unwrap_or(&self.unknown_phase)
    }

    /// Validate the tables for internal consistency
    ///
    /// Returns a list of problems; empty when the tables are sound.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.fetal_development.is_empty() {
            errors.push("Fetal development table is empty".to_string());
        }

        for (week, info) in &self.fetal_development {
            if *week != info.week {
                errors.push(format!(
                    "Fetal development key {} holds entry for week {}",
                    week, info.week
                ));
            }
            if *week > 42 {
                errors.push(format!("Fetal development week {} is beyond term", week));
            }
            for (field, text) in [
                ("title", &info.title),
                ("development", &info.development),
                ("size", &info.size),
                ("weight", &info.weight),
                ("milestone", &info.milestone),
            ] {
                if text.trim().is_empty() {
                    errors.push(format!("Week {}: empty {}", week, field));
                }
            }
        }

        for trimester in Trimester::ALL {
            match self.prenatal_care.get(&trimester) {
                Some(care) => {
                    if care.trimester != trimester {
                        errors.push(format!(
                            "Prenatal care key {} holds entry for trimester {}",
                            trimester, care.trimester
                        ));
                    }
                    for (field, items) in [
                        ("nutrition", &care.nutrition),
                        ("lifestyle", &care.lifestyle),
                        ("warning_signs", &care.warning_signs),
                        ("examinations", &care.examinations),
                        ("vaccines", &care.vaccines),
                        ("special_care", &care.special_care),
                    ] {
                        if items.is_empty() {
                            errors.push(format!("Trimester {}: no {}", trimester, field));
                        }
                    }
                }
                None => errors.push(format!("Missing prenatal care for trimester {}", trimester)),
            }
        }

        for phase in CyclePhase::ALL {
            match self.phases.get(&phase) {
                Some(d) if d.phase != Some(phase) => {
                    errors.push(format!("Phase key {} holds a different descriptor", phase))
                }
                Some(_) => {}
                None => errors.push(format!("Missing descriptor for phase {}", phase)),
            }
        }

        errors
    }
}

static FALLBACK_DEVELOPMENT: Lazy<FetalDevelopmentInfo> = Lazy::new(|| FetalDevelopmentInfo {
    week: 0,
    title: "Development information unavailable".into(),
    development: "No development notes are recorded for this week.".into(),
    size: "-".into(),
    weight: "-".into(),
    milestone: "-".into(),
});

static FALLBACK_CARE: Lazy<PrenatalCareInfo> = Lazy::new(|| PrenatalCareInfo {
    trimester: Trimester::First,
    nutrition: vec!["Follow the guidance of your prenatal care provider.".into()],
    lifestyle: vec![],
    warning_signs: vec![],
    examinations: vec![],
    vaccines: vec![],
    special_care: vec![],
});

/// Builds the reference tables from the built-in data
pub fn build_reference_tables() -> ReferenceTables {
    ReferenceTables {
        fetal_development: build_fetal_development(),
        prenatal_care: build_prenatal_care(),
        phases: build_phases(),
        unknown_phase: PhaseDescriptor {
            phase: None,
            summary: "Phase not recognised. Cycle phases are menstrual, follicular, fertile and luteal."
                .into(),
            cervical_mucus: "Varies across the cycle; track daily to see your own pattern.".into(),
            basal_temperature: "Lower before ovulation, higher after it.".into(),
            dominant_hormones: "Estrogen and progesterone in turn.".into(),
        },
    }
}

fn week(
    week: u32,
    title: &str,
    development: &str,
    size: &str,
    weight: &str,
    milestone: &str,
) -> (u32, FetalDevelopmentInfo) {
    (
        week,
        FetalDevelopmentInfo {
            week,
            title: title.into(),
            development: development.into(),
            size: size.into(),
            weight: weight.into(),
            milestone: milestone.into(),
        },
    )
}

fn build_fetal_development() -> BTreeMap<u32, FetalDevelopmentInfo> {
    BTreeMap::from([
        week(
            4,
            "Implantation",
            "The blastocyst implants in the uterine lining and the placenta begins to form.",
            "about 1 mm",
            "under 1 g",
            "A home pregnancy test can turn positive.",
        ),
        week(
            6,
            "Heartbeat",
            "The neural tube closes and the primitive heart starts beating.",
            "about 4 mm (lentil)",
            "under 1 g",
            "Cardiac activity may be visible on a transvaginal scan.",
        ),
        week(
            8,
            "Embryo takes shape",
            "Arms and legs lengthen, fingers begin to form and all major organs have started developing.",
            "about 1.6 cm (raspberry)",
            "about 1 g",
            "End of the critical period of organ formation approaches.",
        ),
        week(
            10,
            "Fetal period begins",
            "The embryo is now a fetus; vital organs are in place and begin to function.",
            "about 3 cm (kumquat)",
            "about 4 g",
            "Screening blood tests become available.",
        ),
        week(
            12,
            "End of first trimester",
            "Reflexes appear, fingernails form and the kidneys start producing urine.",
            "about 5.4 cm (lime)",
            "about 14 g",
            "Nuchal translucency scan window.",
        ),
        week(
            14,
            "Facial expressions",
            "The fetus can squint, frown and suck its thumb; fine hair (lanugo) begins to grow.",
            "about 8.7 cm (lemon)",
            "about 43 g",
            "Start of the second trimester.",
        ),
        week(
            16,
            "Skeleton hardens",
            "Bones continue to ossify and the eyes make small movements.",
            "about 11.6 cm (avocado)",
            "about 100 g",
            "Some parents feel the first flutters.",
        ),
        week(
            18,
            "Hearing develops",
            "Ear structures mature and the fetus may respond to sound.",
            "about 14.2 cm (bell pepper)",
            "about 190 g",
            "Movements become easier to notice.",
        ),
        week(
            20,
            "Halfway point",
            "Vernix coats the skin and the fetus swallows amniotic fluid.",
            "about 25.6 cm crown to heel (banana)",
            "about 300 g",
            "Detailed anatomy scan.",
        ),
        week(
            24,
            "Viability threshold",
            "Lungs develop branches and cells that produce surfactant.",
            "about 30 cm (corn)",
            "about 600 g",
            "Glucose tolerance screening window opens.",
        ),
        week(
            28,
            "Third trimester",
            "Eyes can open and close; the brain grows rapidly.",
            "about 37.6 cm (eggplant)",
            "about 1 kg",
            "Start of the third trimester; kick counting is often advised.",
        ),
        week(
            32,
            "Gaining weight",
            "Fat accumulates under the skin and bones are fully formed but still soft.",
            "about 42.4 cm (squash)",
            "about 1.7 kg",
            "Growth scans if indicated.",
        ),
        week(
            36,
            "Getting into position",
            "Most fetuses settle head-down; lungs are nearly mature.",
            "about 47.4 cm (honeydew)",
            "about 2.6 kg",
            "Group B strep screening.",
        ),
        week(
            40,
            "Due date",
            "The baby is fully developed and ready for birth.",
            "about 51.2 cm (watermelon)",
            "about 3.4 kg",
            "Estimated due date.",
        ),
    ])
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn build_prenatal_care() -> HashMap<Trimester, PrenatalCareInfo> {
    let mut care = HashMap::new();

    care.insert(
        Trimester::First,
        PrenatalCareInfo {
            trimester: Trimester::First,
            nutrition: strings(&[
                "Take 400 mcg of folic acid daily.",
                "Eat small, frequent meals to manage nausea.",
                "Avoid raw fish, unpasteurised dairy and undercooked meat.",
            ]),
            lifestyle: strings(&[
                "Stop alcohol and smoking completely.",
                "Limit caffeine to 200 mg per day.",
                "Rest when tired; fatigue is common.",
            ]),
            warning_signs: strings(&[
                "Heavy vaginal bleeding.",
                "Severe one-sided abdominal pain.",
                "Persistent vomiting that prevents keeping fluids down.",
            ]),
            examinations: strings(&[
                "First prenatal visit and dating ultrasound.",
                "Blood type, blood count and infection screening.",
                "Nuchal translucency and combined screening (weeks 11-14).",
            ]),
            vaccines: strings(&["Influenza vaccine during flu season."]),
            special_care: strings(&[
                "Review any regular medication with your provider.",
            ]),
        },
    );

    care.insert(
        Trimester::Second,
        PrenatalCareInfo {
            trimester: Trimester::Second,
            nutrition: strings(&[
                "Increase iron and calcium intake.",
                "Add roughly 340 extra calories per day.",
            ]),
            lifestyle: strings(&[
                "Keep up moderate exercise such as walking or swimming.",
                "Sleep on your side as the bump grows.",
            ]),
            warning_signs: strings(&[
                "Regular contractions before 37 weeks.",
                "Fluid leaking from the vagina.",
                "Sudden swelling of the face or hands.",
            ]),
            examinations: strings(&[
                "Anatomy scan (weeks 18-22).",
                "Glucose tolerance test (weeks 24-28).",
            ]),
            vaccines: strings(&["Tdap vaccine from week 20 onwards."]),
            special_care: strings(&[
                "Anti-D immunoglobulin around week 28 if Rh negative.",
            ]),
        },
    );

    care.insert(
        Trimester::Third,
        PrenatalCareInfo {
            trimester: Trimester::Third,
            nutrition: strings(&[
                "Add roughly 450 extra calories per day.",
                "Keep hydrated and eat fibre to prevent constipation.",
            ]),
            lifestyle: strings(&[
                "Prepare a birth plan and hospital bag.",
                "Avoid long trips after week 36.",
            ]),
            warning_signs: strings(&[
                "Reduced fetal movements.",
                "Severe headache or visual disturbance.",
                "Vaginal bleeding or rupture of membranes.",
            ]),
            examinations: strings(&[
                "Visits every two weeks, weekly after week 36.",
                "Group B strep screening (weeks 35-37).",
                "Blood pressure and urine protein checks.",
            ]),
            vaccines: strings(&["RSV vaccine (weeks 32-36) where offered."]),
            special_care: strings(&[
                "Count fetal kicks daily.",
                "Learn the signs of labour.",
            ]),
        },
    );

    care
}

fn phase(
    phase: CyclePhase,
    summary: &str,
    cervical_mucus: &str,
    basal_temperature: &str,
    dominant_hormones: &str,
) -> (CyclePhase, PhaseDescriptor) {
    (
        phase,
        PhaseDescriptor {
            phase: Some(phase),
            summary: summary.into(),
            cervical_mucus: cervical_mucus.into(),
            basal_temperature: basal_temperature.into(),
            dominant_hormones: dominant_hormones.into(),
        },
    )
}

fn build_phases() -> HashMap<CyclePhase, PhaseDescriptor> {
    HashMap::from([
        phase(
            CyclePhase::Menstrual,
            "The uterine lining sheds; day 1 of the cycle.",
            "Masked by menstrual flow.",
            "Low, at the pre-ovulatory baseline.",
            "Estrogen and progesterone both low.",
        ),
        phase(
            CyclePhase::Follicular,
            "Follicles mature and the uterine lining rebuilds.",
            "Dry or sticky, becoming creamy.",
            "Stays at the low baseline.",
            "Rising estrogen, FSH.",
        ),
        phase(
            CyclePhase::Fertile,
            "Ovulation approaches; conception is possible.",
            "Clear, stretchy and slippery, like raw egg white.",
            "Lowest point, then a rise of 0.2-0.5 °C after ovulation.",
            "Estrogen peak and LH surge.",
        ),
        phase(
            CyclePhase::Luteal,
            "The corpus luteum supports a possible pregnancy.",
            "Thick, sticky or dry.",
            "Elevated until the next period.",
            "Progesterone.",
        ),
    ])
}
