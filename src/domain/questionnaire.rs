//! Closed field identifiers for the built-in compatibility questionnaire.
//!
//! One enum per answer kind, so a rating can never be addressed as a set.

use crate::domain::model::AnswerKind;

pub trait TypedField: Copy + 'static {
    const KIND: AnswerKind;

    fn all() -> &'static [Self];
    fn name(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiSelect {
    Expectations,
    Interests,
    Hobbies,
    ImportantRelationshipTraits,
    FutureOutlook,
    FamilyImportance,
    FutureMoves,
    MoneyHandling,
    TrustIssues,
    AcceptanceNeeds,
    StressResponse,
    LifePriorities,
}

impl TypedField for MultiSelect {
    const KIND: AnswerKind = AnswerKind::MultiSelect;

    fn all() -> &'static [Self] {
        &[
            Self::Expectations,
            Self::Interests,
            Self::Hobbies,
            Self::ImportantRelationshipTraits,
            Self::FutureOutlook,
            Self::FamilyImportance,
            Self::FutureMoves,
            Self::MoneyHandling,
            Self::TrustIssues,
            Self::AcceptanceNeeds,
            Self::StressResponse,
            Self::LifePriorities,
        ]
    }

    fn name(self) -> &'static str {
        match self {
            Self::Expectations => "expectations",
            Self::Interests => "interests",
            Self::Hobbies => "hobbies",
            Self::ImportantRelationshipTraits => "importantRelationshipTraits",
            Self::FutureOutlook => "futureOutlook",
            Self::FamilyImportance => "familyImportance",
            Self::FutureMoves => "futureMoves",
            Self::MoneyHandling => "moneyHandling",
            Self::TrustIssues => "trustIssues",
            Self::AcceptanceNeeds => "acceptanceNeeds",
            Self::StressResponse => "stressResponse",
            Self::LifePriorities => "lifePriorities",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatingField {
    TimeTogether,
    EmotionalSupport,
    FinancialGoals,
    CommunicationTendency,
    ConflictResolution,
    HouseworkSplit,
    ReligionImportance,
    PoliticalViews,
    SocialLife,
    FriendsTime,
    HealthImportance,
    SexualCompatibility,
    OverallRating,
}

impl TypedField for RatingField {
    const KIND: AnswerKind = AnswerKind::Rating;

    fn all() -> &'static [Self] {
        &[
            Self::TimeTogether,
            Self::EmotionalSupport,
            Self::FinancialGoals,
            Self::CommunicationTendency,
            Self::ConflictResolution,
            Self::HouseworkSplit,
            Self::ReligionImportance,
            Self::PoliticalViews,
            Self::SocialLife,
            Self::FriendsTime,
            Self::HealthImportance,
            Self::SexualCompatibility,
            Self::OverallRating,
        ]
    }

    fn name(self) -> &'static str {
        match self {
            Self::TimeTogether => "timeTogether",
            Self::EmotionalSupport => "emotionalSupport",
            Self::FinancialGoals => "financialGoals",
            Self::CommunicationTendency => "communicationTendency",
            Self::ConflictResolution => "conflictResolution",
            Self::HouseworkSplit => "houseworkSplit",
            Self::ReligionImportance => "religionImportance",
            Self::PoliticalViews => "politicalViews",
            Self::SocialLife => "socialLife",
            Self::FriendsTime => "friendsTime",
            Self::HealthImportance => "healthImportance",
            Self::SexualCompatibility => "sexualCompatibility",
            Self::OverallRating => "overallRating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceField {
    PersonalityType,
    ChildrenDesire,
    Pets,
    IncomeRequirements,
    Gender,
}

impl TypedField for ChoiceField {
    const KIND: AnswerKind = AnswerKind::Choice;

    fn all() -> &'static [Self] {
        &[
            Self::PersonalityType,
            Self::ChildrenDesire,
            Self::Pets,
            Self::IncomeRequirements,
            Self::Gender,
        ]
    }

    fn name(self) -> &'static str {
        match self {
            Self::PersonalityType => "personalityType",
            Self::ChildrenDesire => "childrenDesire",
            Self::Pets => "pets",
            Self::IncomeRequirements => "incomeRequirements",
            Self::Gender => "gender",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    SelfDescription,
    IdealPartner,
    Email,
    Age,
    Name,
}

impl TypedField for TextField {
    const KIND: AnswerKind = AnswerKind::Text;

    fn all() -> &'static [Self] {
        &[
            Self::SelfDescription,
            Self::IdealPartner,
            Self::Email,
            Self::Age,
            Self::Name,
        ]
    }

    fn name(self) -> &'static str {
        match self {
            Self::SelfDescription => "selfDescription",
            Self::IdealPartner => "idealPartner",
            Self::Email => "email",
            Self::Age => "age",
            Self::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatingPair {
    LifeScores,
}

impl TypedField for RatingPair {
    const KIND: AnswerKind = AnswerKind::RatingPair;

    fn all() -> &'static [Self] {
        &[Self::LifeScores]
    }

    fn name(self) -> &'static str {
        match self {
            Self::LifeScores => "lifeScores",
        }
    }
}
