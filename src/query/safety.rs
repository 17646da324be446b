use super::Language;

const ENGLISH: &str = "I can't help with that. Adhikaar.ai only provides lawful legal information. \
If you or someone else is in danger, please contact Nepal Police at 100 or the National Human \
Rights Commission.";

const NEPALI: &str = "माफ गर्नुहोस्, म यसमा सहयोग गर्न सक्दिन। अधिकार.एआईले कानुनसम्मत जानकारी मात्र \
दिन्छ। यदि तपाईं वा अरू कोही खतरामा हुनुहुन्छ भने कृपया नेपाल प्रहरी (१००) वा राष्ट्रिय मानव अधिकार \
आयोगमा सम्पर्क गर्नुहोस्।";

const ROMANIZED_NEPALI: &str = "Maaf garnuhos, ma yasma sahayog garna sakdina. Adhikaar.ai le \
kanun sammat jankari matra dinchha. Yadi tapai wa aru kohi khatarama hunuhunchha bhane kripaya \
Nepal Prahari (100) wa Rashtriya Manav Adhikar Aayog ma samparka garnuhos.";

/// Fixed reply for `harmful_intent`; never model-generated.
pub fn safety_message(language: Language) -> &'static str {
    match language {
        Language::English => ENGLISH,
        Language::Nepali => NEPALI,
        Language::RomanizedNepali => ROMANIZED_NEPALI,
    }
}
