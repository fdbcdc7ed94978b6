//! PlantVillage label set
//!
//! The order of [`CLASS_NAMES`] is the order the classifier was trained with
//! (alphabetical class directories). Index `i` of the model output is the
//! probability of `CLASS_NAMES[i]`; reordering this table silently corrupts
//! every prediction.

use crate::NUM_CLASSES;

/// Separator between plant and condition in a label
pub const LABEL_SEPARATOR: &str = "___";

/// PlantVillage class names - MUST match training sort order (case-sensitive).
pub const CLASS_NAMES: [&str; NUM_CLASSES] = [
    "Apple___Apple_scab",                                 // 0
    "Apple___Black_rot",                                  // 1
    "Apple___Cedar_apple_rust",                           // 2
    "Apple___healthy",                                    // 3
    "Blueberry___healthy",                                // 4
    "Cherry_(including_sour)___Powdery_mildew",           // 5
    "Cherry_(including_sour)___healthy",                  // 6
    "Corn_(maize)___Cercospora_leaf_spot Gray_leaf_spot", // 7
    "Corn_(maize)___Common_rust_",                        // 8
    "Corn_(maize)___Northern_Leaf_Blight",                // 9
    "Corn_(maize)___healthy",                             // 10
    "Grape___Black_rot",                                  // 11
    "Grape___Esca_(Black_Measles)",                       // 12
    "Grape___Leaf_blight_(Isariopsis_Leaf_Spot)",         // 13
    "Grape___healthy",                                    // 14
    "Orange___Haunglongbing_(Citrus_greening)",           // 15
    "Peach___Bacterial_spot",                             // 16
    "Peach___healthy",                                    // 17
    "Pepper,_bell___Bacterial_spot",                      // 18
    "Pepper,_bell___healthy",                             // 19
    "Potato___Early_blight",                              // 20
    "Potato___Late_blight",                               // 21
    "Potato___healthy",                                   // 22
    "Raspberry___healthy",                                // 23
    "Soybean___healthy",                                  // 24
    "Squash___Powdery_mildew",                            // 25
    "Strawberry___Leaf_scorch",                           // 26
    "Strawberry___healthy",                               // 27
    "Tomato___Bacterial_spot",                            // 28
    "Tomato___Early_blight",                              // 29
    "Tomato___Late_blight",                               // 30
    "Tomato___Leaf_Mold",                                 // 31
    "Tomato___Septoria_leaf_spot",                        // 32
    "Tomato___Spider_mites Two-spotted_spider_mite",      // 33
    "Tomato___Target_Spot",                               // 34
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",             // 35
    "Tomato___Tomato_mosaic_virus",                       // 36
    "Tomato___healthy",                                   // 37
];

/// Get the class name for a given label index
pub fn class_name(label: usize) -> Option<&'static str> {
    CLASS_NAMES.get(label).copied()
}

/// Get the label index for a given class name
pub fn class_index(name: &str) -> Option<usize> {
    CLASS_NAMES.iter().position(|&n| n == name)
}

/// Check if a label represents a healthy plant (not diseased)
pub fn is_healthy(name: &str) -> bool {
    name.ends_with("healthy")
}

/// Get the plant part of a label (e.g., "Tomato" from "Tomato___Bacterial_spot")
pub fn plant_name(name: &str) -> &str {
    name.split(LABEL_SEPARATOR).next().unwrap_or(name)
}

/// Human-readable form of a label: "Corn_(maize)___Common_rust_" -> "Corn (maize) - Common rust"
pub fn display_name(name: &str) -> String {
    let tidy = |part: &str| part.replace('_', " ").trim().to_string();

    match name.split_once(LABEL_SEPARATOR) {
        Some((plant, condition)) => format!("{} - {}", tidy(plant), tidy(condition)),
        None => tidy(name),
    }
}

/// Distinct plant names in label order
pub fn plants() -> Vec<&'static str> {
    let mut plants: Vec<&'static str> = Vec::new();
    for name in CLASS_NAMES {
        let plant = plant_name(name);
        if !plants.contains(&plant) {
            plants.push(plant);
        }
    }
    plants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_set_size_and_names() {
        assert_eq!(CLASS_NAMES.len(), 38);
        for idx in 0..NUM_CLASSES {
            let name = class_name(idx).unwrap();
            assert!(!name.is_empty());
            assert!(name.contains(LABEL_SEPARATOR), "{name} is not <Plant>___<Condition>");
        }
        assert_eq!(class_name(38), None);
    }

    #[test]
    fn test_labels_are_sorted_and_unique() {
        let mut sorted = CLASS_NAMES.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, CLASS_NAMES.to_vec());
    }

    #[test]
    fn test_class_index() {
        assert_eq!(class_index("Apple___Apple_scab"), Some(0));
        assert_eq!(class_index("Tomato___healthy"), Some(37));
        assert_eq!(class_index("Unknown___class"), None);
    }

    #[test]
    fn test_is_healthy() {
        assert!(!is_healthy(CLASS_NAMES[0]));
        assert!(is_healthy(CLASS_NAMES[3]));
        assert!(is_healthy(CLASS_NAMES[37]));
        assert_eq!(CLASS_NAMES.iter().filter(|n| is_healthy(n)).count(), 12);
    }

    #[test]
    fn test_plant_and_display_name() {
        assert_eq!(plant_name(CLASS_NAMES[28]), "Tomato");
        assert_eq!(display_name("Corn_(maize)___Common_rust_"), "Corn (maize) - Common rust");
        assert_eq!(display_name("NoSeparator"), "NoSeparator");
    }

    #[test]
    fn test_plants() {
        let plants = plants();
        assert_eq!(plants.len(), 14);
        assert_eq!(plants[0], "Apple");
        assert_eq!(plants[13], "Tomato");
    }
}
