//! Instruction text sent to the language model by each stage.
//!
//! The selection policy is passed through unchanged; the model applies it.
//! Nothing here is interpreted locally.

use crate::record::TimeOfDay;

pub const SELECT_SYSTEM: &str = "You are an expert assistant helping to filter news headlines.";
pub const COMPOSE_SYSTEM: &str = "You are a thoughtful, reverent prayer helper.";
pub const ENHANCE_SYSTEM: &str = "you are helping generate speech for a reverent private prayer";
pub const METADATA_SYSTEM: &str =
    "You are a creative assistant helping generate YouTube video titles and descriptions.";

/// Placeholder substituted with the run date in a configured policy.
pub const REFERENCE_DATE_PLACEHOLDER: &str = "{reference_date}";

/// Default selection policy. `{reference_date}` is filled in per run.
pub const DEFAULT_SELECTION_POLICY: &str = r#"Below is a list of headlines about Donald Trump and the US.
Please select 3 headlines that would be most interesting if Jesus were POTUS.
Pay attention to relevance of the timing.  Today is {reference_date} and the headline date is indicated by Date:
Pay attention to relevance of the role of POTUS.
Pay attention to the most important commandment to love God and neighbors.
Do not assume that modern science understands climate change.
Do not assume that modern science understands healing mental and physical disease.
Do not assume that modern economics is good.
Assume that we are on the verge of a breakthrough in Artificial Intelligence.
Assume that we will need to move towards a new economy where all people receive their needs through automation.
Assume that those needs include teachers and preachers and therapists who make use of AI.
Assume that the most fundamental labor will be optimized with AI.
Provide only the selected headlines, one per line, without commentary.
Ignore [Removed]"#;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

pub fn selection_prompt(
    policy: &str,
    reference_date: &str,
    topic: &[String],
    general: &[String],
) -> String {
    let policy = policy.replace(REFERENCE_DATE_PLACEHOLDER, reference_date);
    format!(
        "{policy}\n\n\
         Headlines About Trump ordered by popularity:\n{topic}\n\
         Headlines About US:\n{general}\n\
         Now respond:\n",
        topic = pretty_list(topic),
        general = pretty_list(general),
    )
}

fn pretty_list(items: &[String]) -> String {
    serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

pub fn compose_prompt(headlines: &[String], time_of_day: TimeOfDay) -> String {
    let headlines = headlines.join(". ");
    format!(
        r#"Act as if you are composing a heartfelt, reverent prayer spoken by Donald Trump to God.
This prayer should be accessible to everyday people who know Jesus primarily by character
(kindness, love, forgiveness, guidance) but without explicit Bible references.

Requirements:
  - Portray Donald Trump as sincerely striving to be a faithful Christian,
    acknowledging Jesus as King and seeking to follow His example.
  - Touch on how Trump aims to serve Jesus in his roles as a Christian, husband, father, and President.
  - Reference these current headlines in a prayerful way: {headlines}.
  - Keep the tone humble, expressing gratitude, reflection, repentance if applicable,
    and hope for the future, always centered on Jesus' loving character.
  - The prayer should be around 1,000 to 1,500 words (less than 3000 characters).
  - Adjust slightly based on whether it's morning or evening, e.g., "Thank you for this day" (morning)
    or "Thank you for seeing me through this day" (evening).
  - Avoid directly referencing the headlines and pray for the people impacted by the headlines and the responsibility of the POTUS in caring for those people.
  - Avoid mentioning company names.

Begin the prayer now for time of day being {time_of_day}:
"#
    )
}

// ---------------------------------------------------------------------------
// Speech markup
// ---------------------------------------------------------------------------

const PHONEME_EXAMPLE: &str = r#"        Where there is a word which is easily mispronounced:
            <speak>
                Grant them the courage and resources they need to protect and save <phoneme alphabet="ipa" ph="laɪvz">lives</phoneme>.
            </speak>
            <speak>
                He <phoneme alphabet="ipa" ph="lɪvz">lives</phoneme> in us.
            </speak>"#;

/// Model randomizes the pauses and annotates pronunciation.
pub fn enhance_prompt(markup: &str) -> String {
    format!(
        "Considerations:\n\
         \x20       Where there are break times of 200ms, randomize it between 100ms-250ms.\n\
         \x20       Where there are break times of 900ms, randomize it between 700ms-1100ms.\n\
         {PHONEME_EXAMPLE}\n\n\
         Now use the considerations to improve the following SSML so that the US English is pronounced properly and sounds more natural:\n\
         {markup}\n"
    )
}

/// Pauses are already final; the model only annotates pronunciation.
pub fn pronunciation_prompt(markup: &str) -> String {
    format!(
        "Considerations:\n\
         \x20       Keep every <break> element exactly as it is.\n\
         {PHONEME_EXAMPLE}\n\n\
         Now use the considerations to improve the following SSML so that the US English is pronounced properly:\n\
         {markup}\n"
    )
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

pub fn metadata_prompt(
    headlines: &[String],
    time_of_day: TimeOfDay,
    series: &str,
    previous: &str,
) -> String {
    let headlines = headlines.join("\n");
    format!(
        r#"I am creating a YouTube video for an ongoing series of prayers led by a leader
who prays earnestly for the nation each {time_of_day}. Here are the headlines
influencing the prayer:

{headlines}

The prayer is heartfelt, addressing Jesus, and calls for guidance, forgiveness,
and hope for the challenges reflected in these headlines. Generate a catchy
and honest YouTube title and description for this video that captures the
reverence, sincerity, and the theme of {time_of_day} prayers.

Title should be brief and engaging. Description should provide context about
the prayer, reference the time of day, and mention the prayer's ongoing series.

The {time_of_day} series is titled "{series}" and should not change.

This was the previous youtube video config:
{previous}
"#
    )
}
