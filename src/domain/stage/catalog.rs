//! Built-in twelve-stage catalog.
//!
//! Wording is illustrative and may be replaced wholesale; the structure
//! (fields, predicates, strategies) is what the engine depends on.

use crate::domain::foundation::StageId;

use super::definition::{
    CompletionPredicate, FallbackCheck, FieldKind, FieldSpec, GateStrategy, OpenerFormat,
    SemanticCheck, StageDefinition,
};
use super::registry::MIN_STUCK_THRESHOLD;
use super::template::ScriptTemplate;

/// Phrases that close a stage in any language the engine ships with.
pub const DEFAULT_COMPLETION_SIGNALS: &[&str] = &[
    "that's all",
    "thats all",
    "that is all",
    "nothing more",
    "nothing else",
    "i already told you",
    "i already said",
    "i'm done",
    "im done",
    "זהו",
    "זה הכל",
    "אין יותר",
    "אין עוד",
    "כבר אמרתי",
    "סיימתי",
];

const EVENT_TIME_MARKERS: &[&str] = &[
    "yesterday",
    "today",
    "this morning",
    "last week",
    "last night",
    "last month",
    "on monday",
    "on tuesday",
    "on wednesday",
    "on thursday",
    "on friday",
    "on saturday",
    "on sunday",
    "ago",
    "אתמול",
    "היום",
    "הבוקר",
    "בבוקר",
    "בערב",
    "שבוע שעבר",
    "בשבוע שעבר",
    "לפני",
];

const PATTERN_RECURRENCE_MARKERS: &[&str] = &[
    "always",
    "again",
    "every time",
    "whenever",
    "often",
    "usually",
    "keeps happening",
    "each time",
    "pattern",
    "תמיד",
    "שוב",
    "כל פעם",
    "בכל פעם",
    "הרבה פעמים",
    "כל הזמן",
    "חוזר",
];

/// Spoken once the final stage completes.
pub fn closing_script() -> ScriptTemplate {
    ScriptTemplate::with_fallback(
        "Thank you. You committed to: \"{commitment}\". We have walked the whole path together.",
        "Thank you. We have walked the whole path together.",
    )
}

fn signals() -> Vec<String> {
    DEFAULT_COMPLETION_SIGNALS.iter().map(|s| s.to_string()).collect()
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn text(name: &str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Text)
}

struct Scripts {
    advance: ScriptTemplate,
    loop_prompt: ScriptTemplate,
    rationale: &'static str,
    example: ScriptTemplate,
    rephrasings: &'static [&'static str],
}

fn stage(
    id: StageId,
    fields: Vec<FieldSpec>,
    predicate: CompletionPredicate,
    strategy: GateStrategy,
    opener_format: OpenerFormat,
    scripts: Scripts,
) -> StageDefinition {
    StageDefinition {
        id,
        fields,
        predicate,
        strategy,
        advance_script: scripts.advance,
        loop_script: scripts.loop_prompt,
        rationale: scripts.rationale.to_string(),
        example: scripts.example,
        rephrasings: words(scripts.rephrasings),
        opener_format,
        completion_signals: signals(),
        stuck_threshold: MIN_STUCK_THRESHOLD,
    }
}

/// All twelve stage definitions in order.
pub fn definitions() -> Vec<StageDefinition> {
    vec![
        stage(
            StageId::Topic,
            vec![text("topic")],
            CompletionPredicate::NonEmpty {
                field: "topic".into(),
                min_words: 1,
            },
            GateStrategy::Deterministic,
            OpenerFormat::FreeText,
            Scripts {
                advance: ScriptTemplate::new("What would you like to look at today?"),
                loop_prompt: ScriptTemplate::new("Name the topic in a few words."),
                rationale: "A clear topic keeps the rest of our conversation focused.",
                example: ScriptTemplate::new("For example: my relationship with my manager."),
                rephrasings: &[
                    "Which area of your life is on your mind?",
                    "What subject do you want to focus on?",
                    "If you had to title it, what would the topic be?",
                ],
            },
        ),
        stage(
            StageId::Event,
            vec![text("event"), FieldSpec::new("event_concrete", FieldKind::Flag)],
            CompletionPredicate::Confirmed {
                field: "event".into(),
                flag: "event_concrete".into(),
            },
            GateStrategy::Semantic(SemanticCheck {
                question: "Does the text describe one specific, concrete event that happened \
                           at a particular time, with who was involved and what happened?"
                    .into(),
                fallback: FallbackCheck {
                    min_words: 6,
                    keywords: words(EVENT_TIME_MARKERS),
                },
            }),
            OpenerFormat::FreeText,
            Scripts {
                advance: ScriptTemplate::with_fallback(
                    "About {topic}: tell me about one specific moment when it happened. When was it, who was there, what happened?",
                    "Tell me about one specific moment when it happened. When was it, who was there, what happened?",
                ),
                loop_prompt: ScriptTemplate::new(
                    "Pick one specific time it happened. When was it and what happened?",
                ),
                rationale: "A single concrete moment lets us look at what really happened instead of a general impression.",
                example: ScriptTemplate::with_fallback(
                    "For example: last Tuesday, in the meeting about {topic}, my manager cut me off.",
                    "For example: last Tuesday, in the team meeting, my manager cut me off.",
                ),
                rephrasings: &[
                    "Think of the last time this happened. What exactly took place?",
                    "Describe one particular day when this came up.",
                    "Which single moment stands out? Walk me through it.",
                ],
            },
        ),
        stage(
            StageId::Emotions,
            vec![FieldSpec::new("emotions", FieldKind::List)],
            CompletionPredicate::MinItems {
                field: "emotions".into(),
                min: 4,
            },
            GateStrategy::Deterministic,
            OpenerFormat::ListEcho,
            Scripts {
                advance: ScriptTemplate::new(
                    "What did you feel in that moment? Name as many feelings as you can.",
                ),
                loop_prompt: ScriptTemplate::with_fallback(
                    "What else did you feel? {missing} more.",
                    "What else did you feel?",
                ),
                rationale: "Naming several feelings shows the full picture, not just the loudest one.",
                example: ScriptTemplate::with_fallback(
                    "You already named {emotions}. Others might be embarrassment or disappointment.",
                    "For example: anger, embarrassment, disappointment, helplessness.",
                ),
                rephrasings: &[
                    "Which other feelings were there, even small ones?",
                    "If you scan your body in that moment, what else was there?",
                    "Besides what you said, what other emotions came up?",
                ],
            },
        ),
        stage(
            StageId::Thought,
            vec![text("thought")],
            CompletionPredicate::NonEmpty {
                field: "thought".into(),
                min_words: 2,
            },
            GateStrategy::Deterministic,
            OpenerFormat::FreeText,
            Scripts {
                advance: ScriptTemplate::with_fallback(
                    "You felt {emotions}. What went through your mind in that moment?",
                    "What went through your mind in that moment?",
                ),
                loop_prompt: ScriptTemplate::new("What was the sentence in your head right then?"),
                rationale: "The thought in that moment often drives what we do next.",
                example: ScriptTemplate::new("For example: \"here we go again, nobody listens to me\"."),
                rephrasings: &[
                    "What did you tell yourself right then?",
                    "Which words were running through your head?",
                    "If your thoughts had a voice, what did it say?",
                ],
            },
        ),
        stage(
            StageId::Action,
            vec![text("action")],
            CompletionPredicate::NonEmpty {
                field: "action".into(),
                min_words: 2,
            },
            GateStrategy::Deterministic,
            OpenerFormat::FreeText,
            Scripts {
                advance: ScriptTemplate::new("And what did you actually do?"),
                loop_prompt: ScriptTemplate::new("Describe what you did, even if it was doing nothing."),
                rationale: "Looking at what you did shows how the thought turned into action.",
                example: ScriptTemplate::new("For example: I stayed quiet and left the room early."),
                rephrasings: &[
                    "How did you respond in that moment?",
                    "What was your reaction, in actions?",
                    "What did someone watching you see you do?",
                ],
            },
        ),
        stage(
            StageId::Gap,
            vec![FieldSpec::new("gap_score", FieldKind::Number), text("gap_name")],
            CompletionPredicate::Scored {
                field: "gap_score".into(),
                min: 1,
                max: 10,
            },
            GateStrategy::Deterministic,
            OpenerFormat::FreeText,
            Scripts {
                advance: ScriptTemplate::with_fallback(
                    "You did: {action}. On a scale of 1 to 10, how far was that from how you wanted to act?",
                    "On a scale of 1 to 10, how far was what you did from how you wanted to act?",
                ),
                loop_prompt: ScriptTemplate::new("Give it a number from 1 to 10."),
                rationale: "A number makes the distance between what happened and what you wanted visible.",
                example: ScriptTemplate::new("For example: 7, I wanted to speak up and didn't."),
                rephrasings: &[
                    "From 1 to 10, how big is the gap?",
                    "If 10 is exactly how you wanted to act, where were you?",
                    "Rate the distance from 1 to 10.",
                ],
            },
        ),
        stage(
            StageId::Pattern,
            vec![text("pattern"), FieldSpec::new("pattern_recognized", FieldKind::Flag)],
            CompletionPredicate::Confirmed {
                field: "pattern".into(),
                flag: "pattern_recognized".into(),
            },
            GateStrategy::Semantic(SemanticCheck {
                question: "Does the text describe a recurring pattern of behavior that the \
                           person recognizes happening in more than one situation?"
                    .into(),
                fallback: FallbackCheck {
                    min_words: 4,
                    keywords: words(PATTERN_RECURRENCE_MARKERS),
                },
            }),
            OpenerFormat::FreeText,
            Scripts {
                advance: ScriptTemplate::new(
                    "Does this happen in other places too? Where else do you see yourself reacting this way?",
                ),
                loop_prompt: ScriptTemplate::new("Where else does this same reaction show up?"),
                rationale: "Seeing the same reaction in several places shows it is a pattern and not a one-off.",
                example: ScriptTemplate::with_fallback(
                    "For example: you {action}, and you might do the same with family or friends.",
                    "For example: I always go quiet when someone senior disagrees with me.",
                ),
                rephrasings: &[
                    "Is this familiar from other situations?",
                    "When else have you reacted like this?",
                    "Does this repeat with other people?",
                ],
            },
        ),
        stage(
            StageId::Stance,
            vec![text("stance")],
            CompletionPredicate::NonEmpty {
                field: "stance".into(),
                min_words: 3,
            },
            GateStrategy::Deterministic,
            OpenerFormat::FreeText,
            Scripts {
                advance: ScriptTemplate::new("What do you gain from reacting this way, and what does it cost you?"),
                loop_prompt: ScriptTemplate::new("Say a bit more about the gain and the cost."),
                rationale: "Every pattern gives us something, otherwise we would not keep it.",
                example: ScriptTemplate::new("For example: I avoid conflict, but I lose my voice."),
                rephrasings: &[
                    "What does this pattern give you, and what does it take?",
                    "What is the benefit and what is the price?",
                    "What do you win and what do you lose with it?",
                ],
            },
        ),
        stage(
            StageId::Forces,
            vec![FieldSpec::new("forces", FieldKind::List)],
            CompletionPredicate::MinItems {
                field: "forces".into(),
                min: 4,
            },
            GateStrategy::Deterministic,
            OpenerFormat::ListEcho,
            Scripts {
                advance: ScriptTemplate::new(
                    "Which strengths and resources do you have that could help you act differently?",
                ),
                loop_prompt: ScriptTemplate::with_fallback(
                    "Which other strengths do you have? {missing} more.",
                    "Which other strengths do you have?",
                ),
                rationale: "Knowing your strengths gives you something to lean on when you choose differently.",
                example: ScriptTemplate::new("For example: patience, honesty, humor, persistence."),
                rephrasings: &[
                    "What qualities have helped you in hard moments before?",
                    "What would a friend say you are good at?",
                    "Which of your abilities could support you here?",
                ],
            },
        ),
        stage(
            StageId::Choice,
            vec![text("choice"), FieldSpec::new("choice_confirmed", FieldKind::Flag)],
            CompletionPredicate::Confirmed {
                field: "choice".into(),
                flag: "choice_confirmed".into(),
            },
            GateStrategy::Deterministic,
            OpenerFormat::FreeText,
            Scripts {
                advance: ScriptTemplate::with_fallback(
                    "With {forces} in mind, what do you choose to do differently?",
                    "What do you choose to do differently?",
                ),
                loop_prompt: ScriptTemplate::with_fallback(
                    "You said: \"{choice}\". Is that your choice?",
                    "What do you choose to do differently?",
                ),
                rationale: "A choice you state in your own words is one you can hold on to.",
                example: ScriptTemplate::new("For example: I choose to say what I think in the next meeting."),
                rephrasings: &[
                    "What would you like to do next time?",
                    "Which new way of acting do you pick?",
                    "If you could choose your response, what would it be?",
                ],
            },
        ),
        stage(
            StageId::Vision,
            vec![text("vision")],
            CompletionPredicate::NonEmpty {
                field: "vision".into(),
                min_words: 3,
            },
            GateStrategy::Deterministic,
            OpenerFormat::FreeText,
            Scripts {
                advance: ScriptTemplate::with_fallback(
                    "Imagine you have done it: {choice}. What does it look like?",
                    "Imagine you have done it. What does it look like?",
                ),
                loop_prompt: ScriptTemplate::new("Describe the picture a little more."),
                rationale: "A clear picture of success makes the choice feel reachable.",
                example: ScriptTemplate::new("For example: I speak calmly and people listen."),
                rephrasings: &[
                    "How will you know it worked?",
                    "What will be different once you act on your choice?",
                    "Paint the scene after you have made the change.",
                ],
            },
        ),
        stage(
            StageId::Commitment,
            vec![text("commitment")],
            CompletionPredicate::NonEmpty {
                field: "commitment".into(),
                min_words: 3,
            },
            GateStrategy::Deterministic,
            OpenerFormat::FreeText,
            Scripts {
                advance: ScriptTemplate::new("What is one concrete step you commit to, and when?"),
                loop_prompt: ScriptTemplate::new("Name the step and when you will take it."),
                rationale: "A small concrete step with a time turns the choice into action.",
                example: ScriptTemplate::new("For example: on Sunday I will raise one point in the meeting."),
                rephrasings: &[
                    "What will you do first, and by when?",
                    "Which step will you take this week?",
                    "What is the first action, and on which day?",
                ],
            },
        ),
    ]
}
