//! Versioned keyword tables
//!
//! Every table here is matched as a lower-cased substring. Changing any list
//! changes classification output, so bump [`KEYWORD_TABLE_VERSION`] with it;
//! the version is quoted in every classifier reasoning string.

/// Version of the keyword tables below
pub const KEYWORD_TABLE_VERSION: &str = "2024.2";

// =============================================================================
// SEVERITY CLASSIFIER TIERS (English + Arabic)
// =============================================================================

pub const CRITICAL_KEYWORDS: &[&str] = &[
    "not breathing",
    "no pulse",
    "cardiac arrest",
    "unconscious",
    "massive bleeding",
    "massive hemorrhage",
    "crush",
    "trapped",
    "severe burn",
    "stroke",
    "anaphylaxis",
    "choking",
    "airway obstruction",
    "drowning",
    "electrocution",
    "amputation",
    "not conscious",
    "unresponsive",
    "لا يتنفس",
    "لا نبض",
    "سكتة قلبية",
    "فاقد الوعي",
    "نزيف حاد",
    "محاصر",
    "حروق شديدة",
    "غرق",
];

pub const HIGH_KEYWORDS: &[&str] = &[
    "fracture",
    "broken bone",
    "chest pain",
    "difficulty breathing",
    "head injury",
    "spinal",
    "moderate burn",
    "heavy bleeding",
    "altered consciousness",
    "seizure",
    "deep wound",
    "dislocation",
    "كسر",
    "ألم في الصدر",
    "صعوبة التنفس",
    "إصابة في الرأس",
    "نزيف غزير",
    "تشنج",
    "جرح عميق",
];

pub const MODERATE_KEYWORDS: &[&str] = &[
    "laceration",
    "sprain",
    "minor burn",
    "stitches",
    "swelling",
    "walking wounded",
    "pain",
    "bleeding",
    "wound",
    "cut",
    "جرح",
    "التواء",
    "حرق بسيط",
    "تورم",
    "ألم",
    "نزيف",
];

pub const LOW_KEYWORDS: &[&str] = &[
    "bruise",
    "scratch",
    "anxiety",
    "minor",
    "scrape",
    "sore",
    "tired",
    "scared",
    "stressed",
    "كدمة",
    "خدش",
    "قلق",
    "بسيط",
];

pub const VULNERABILITY_KEYWORDS: &[&str] = &[
    "child",
    "baby",
    "infant",
    "toddler",
    "elderly",
    "old man",
    "old woman",
    "pregnant",
    "disabled",
    "طفل",
    "رضيع",
    "مسن",
    "حامل",
];

// =============================================================================
// CRITICAL KEYWORD DETECTOR GROUPS
// =============================================================================

/// A labelled group of synonymous phrases
pub type KeywordGroup = (&'static str, &'static [&'static str]);

pub const DETECTOR_CRITICAL: &[KeywordGroup] = &[
    (
        "NOT BREATHING",
        &[
            "not breathing",
            "stopped breathing",
            "can't breathe",
            "cant breathe",
            "no breath",
            "choking",
            "suffocating",
            "no air",
        ],
    ),
    (
        "UNCONSCIOUS",
        &[
            "unconscious",
            "not conscious",
            "passed out",
            "fainted",
            "unresponsive",
            "not responding",
            "not waking",
            "collapsed",
            "won't wake",
            "wont wake",
        ],
    ),
    ("NO PULSE", &["no pulse", "heart stopped", "cardiac arrest"]),
    (
        "HEAVY BLEEDING",
        &[
            "bleeding heavily",
            "heavy bleeding",
            "lot of blood",
            "blood everywhere",
            "won't stop bleeding",
            "losing blood",
            "massive bleeding",
            "blood gushing",
        ],
    ),
];

pub const DETECTOR_HIGH: &[KeywordGroup] = &[
    (
        "TRAPPED",
        &[
            "trapped",
            "stuck under",
            "pinned",
            "buried",
            "under debris",
            "can't move",
            "cant move",
            "crushed",
        ],
    ),
    ("CHEST PAIN", &["chest pain", "heart attack"]),
    ("HEAD INJURY", &["head injury", "head wound", "skull", "brain"]),
    (
        "FRACTURE",
        &["broken bone", "fracture", "broken leg", "broken arm"],
    ),
    ("BURN", &["burned", "burning", "on fire", "burn victim"]),
];

pub const DETECTOR_ENVIRONMENTAL: &[KeywordGroup] = &[
    ("FIRE NEARBY", &["fire", "flames", "smoke", "burning building"]),
    ("FLOOD", &["flooding", "water rising", "flood water", "drowning"]),
    ("GAS LEAK", &["gas leak", "gas smell", "smell gas"]),
    (
        "COLLAPSE RISK",
        &["collapsing", "structure unstable", "building falling"],
    ),
    ("EXPLOSION", &["explosion", "blast", "bomb"]),
];

// =============================================================================
// FACT EXTRACTION TABLES
// =============================================================================

/// Disaster types, first match wins
pub const DISASTER_TYPES: &[KeywordGroup] = &[
    ("earthquake", &["earthquake", "quake", "tremor", "زلزال"]),
    ("flood", &["flood", "flooding", "فيضان"]),
    ("tsunami", &["tsunami"]),
    ("hurricane", &["hurricane", "cyclone", "storm", "typhoon"]),
    ("tornado", &["tornado"]),
    ("landslide", &["landslide", "mudslide"]),
    ("explosion", &["explosion", "blast", "bomb", "انفجار"]),
    ("building_collapse", &["building collapse", "collapsed building", "roof fell", "انهيار"]),
    ("fire", &["fire", "flames", "burning", "حريق"]),
];

/// Environmental danger groups reported on the fact record
pub const DANGER_TYPES: &[KeywordGroup] = &[
    ("gas leak", &["gas leak", "gas smell", "smell gas", "smell of gas"]),
    ("fire", &["fire", "flames", "smoke"]),
    ("flood", &["flood water", "rising water", "water rising", "flooding"]),
    (
        "collapse risk",
        &["further collapse", "unstable", "risk of collapse", "collapsing", "cracks"],
    ),
    ("electrical", &["live wire", "power line", "electrical", "sparks"]),
];
