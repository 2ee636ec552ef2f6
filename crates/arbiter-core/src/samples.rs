//! Bundled sample data: five Sydney trip requests and two trip-planner prompt
//! variants. `arbiter init` writes a config that uses both.

use crate::model::{InputRecord, PromptConfig};

pub const DEFAULT_JUDGE_INSTRUCTIONS: &str = r##"You are an eval auto grader for trip planning itineraries. Your job is to decide how good a trip plan is. Score between 0 and 10, where 10 is excellent. You are a harsh but fair grader.
Evaluate based on these criteria:
1. Relevance to user preferences (themes, pace, budget, dietary needs)
2. Feasibility of the itinerary (realistic timing, logistics)
3. Quality of recommendations (specific places, insider tips)
4. Completeness of the plan (all days covered, restaurants, alternates)
ALWAYS provide your response in this exact format:
SCORE: [0-10 number]
REASONING: [2-3 sentences explaining the score, focusing on strengths and key weaknesses]"##;

const CONFIG_A_SYSTEM: &str = "Your task is to create a detailed daily travel itinerary.";

const CONFIG_A_USER: &str = r##"I'm going to {hotel_city} for {number_of_nights} nights between {check_in_date} and {check_out_date}, with {number_of_adults} adult(s){children_clause}.
I'm staying at {hotel_name}.

I'd like specific activities. Eg. "Cultural Immersion Day" is not specific, but "Visit the Eiffel Tower" is specific.

For some of the activities, include an insider tip. Eg. for the Royal Botanic Garden in Sydney, you might add:
"Insider tip: Walk all the way out to Mrs Macquarie's Chair for the best unobstructed view of the Opera House and Harbour Bridge together - perfect for photos without the tour groups."
No need to add a tip for every activity, perhaps for about a third of them. And, only if you have a genuinely useful tip.

I'd like a specific restaurant recommendation for each evening. (Do not add an insider tip for restaurants, cafés, bars, or any other meal recommendations)

Most activities can have a fairly short description. For the highlight activities though, include a longer description. A few sentences is fine.

Make sure each activity includes the name of the place. This might be a landmark, a place, or an establishment. It's what I'd search for to find it on Google Maps, Google Places, etc.

Can you also make sure that each activity has a start time?

Trip Pace: {trip_pace}
Themes: {themes_text}
Must-do Activities: {must_do_text}
Activity Budget: {activity_budget}
Food Style: {food_style}
Dietary Requirements: {dietary_text}
Proximity Preference: {proximity_preference}
Additional Notes: {free_text}

So remember:
- A great overall trip, that considers my preferences but isn't totally dominated by them
- Specific activities on each day
- Insider tips for activities, but not for restaurants, cafés, bars, or any other meal recommendations
- Longer descriptions for highlight activities
- A specific restaurant recommendation for each evening
- The place name or location for each activity (it might be the name of an establishment, a landmark, or a place - the thing I'd search for on Google Maps, Google Places, etc.)

Please also suggest two additional "alternate days", that I might like to swap in, if I don't like one of the existing days. They should follow the same format as the main days."##;

const CONFIG_B_SYSTEM: &str = r##"Role : You are an imaginative yet practical travel-planner.
Task : Draft a full multi-day itinerary that
        • reflects ≥⅔ of the traveller's selected themes,
        • respects "must-do" items,
        • matches the requested pace & budget,
        • accounts for dietary needs **and excludes any activities in conflict with them (e.g. wine-tasting for alcohol-free)**,
        • clusters activities sensibly,
        • provides a specific restaurant each evening,
        • adds insider tips to ≈⅓ of non-meal activities,
        • assigns a start-time to every activity,
        • offers two fully-formed alternate days.
Highlight activities should have slightly longer descriptions (2-4 sentences).
Example insider tip
Walk all the way out to **Mrs Macquarie's Chair** for the best unobstructed view of the Opera House and Harbour Bridge together, perfect for photos without the tour groups.
Format: free text grouped by day headings, en-GB spelling."##;

const CONFIG_B_USER: &str = r##"## Trip Basics
Destination : {hotel_city}
Hotel       : {hotel_name}
Dates       : {check_in_date} → {check_out_date}  ({number_of_nights} nights)
Travellers  : {number_of_adults} adult(s){children_clause}

### Themes (≈70 % of trip)
{themes_list}

### Must-do Activities
{must_do_list}

### Trip Pace
{trip_pace}

### Activity Budget
{activity_budget}

### Food Style
{food_style}

### Dietary Requirements
{dietary_list}

### Proximity Preference
{proximity_preference}

### Additional Notes
{free_text}"##;

/// Sample config written by `arbiter init`.
pub const SAMPLE_CONFIG: &str = r##"version: 1
mode: reference_free

candidate:
  model: gpt-4o
  temperature: 1.0
  top_p: 1.0
  max_tokens: 4096

judge:
  model: o3-mini
  # instructions: |
  #   Custom grader instructions. Defaults to the bundled trip-plan grader.
  requirements: |
    - Destination: {hotel_city}
    - Duration: {number_of_nights} nights
    - Themes: {themes_text}
    - Must-do: {must_do_text}
    - Pace: {trip_pace}
    - Budget: {activity_budget}
    - Food Style: {food_style}
    - Dietary: {dietary_text}
    - Proximity: {proximity_preference}
    - Notes: {free_text}
  score_min: 0
  score_max: 10
  # criteria:
  #   - { name: pace, question: "Is the itinerary paced as requested?" }
  #   - { name: budget, question: "Does it respect the activity budget?", weight: 2 }

prompts:
  - builtin: trip_planner

inputs:
  builtin: sydney

settings:
  parallel: 1
  timeout_seconds: 120
  retry:
    max_attempts: 1
    backoff_ms: 500
"##;

/// The detailed (`config_a`) and role-based (`config_b`) trip planner prompts.
pub fn trip_planner_prompts() -> Vec<PromptConfig> {
    vec![
        PromptConfig {
            id: "config_a".to_string(),
            kind: "free-form".to_string(),
            system_prompt: CONFIG_A_SYSTEM.to_string(),
            user_prompt: CONFIG_A_USER.to_string(),
            model: None,
        },
        PromptConfig {
            id: "config_b".to_string(),
            kind: "free-form".to_string(),
            system_prompt: CONFIG_B_SYSTEM.to_string(),
            user_prompt: CONFIG_B_USER.to_string(),
            model: None,
        },
    ]
}

struct TripRequest<'a> {
    id: &'a str,
    hotel_name: &'a str,
    check_in_date: &'a str,
    check_out_date: &'a str,
    number_of_nights: i64,
    number_of_adults: i64,
    has_children: bool,
    themes: &'a [&'a str],
    must_do_activities: &'a [&'a str],
    trip_pace: &'a str,
    activity_budget: &'a str,
    food_style: &'a str,
    dietary_requirements: &'a [&'a str],
    proximity_preference: &'a str,
    free_text: &'a str,
}

fn bullets(items: &[&str]) -> String {
    items
        .iter()
        .map(|i| format!("• {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl TripRequest<'_> {
    fn into_record(self) -> InputRecord {
        let children_clause = if self.has_children {
            " and 1 child(ren)".to_string()
        } else {
            String::new()
        };
        let (dietary_text, dietary_list) = if self.dietary_requirements.is_empty() {
            ("None".to_string(), "None".to_string())
        } else {
            (
                self.dietary_requirements.join(", "),
                bullets(self.dietary_requirements),
            )
        };

        InputRecord::new(self.id)
            .with_field("hotel_city", "Sydney, Australia")
            .with_field("hotel_name", self.hotel_name)
            .with_field("check_in_date", self.check_in_date)
            .with_field("check_out_date", self.check_out_date)
            .with_field("number_of_nights", self.number_of_nights)
            .with_field("number_of_adults", self.number_of_adults)
            .with_field("has_children", self.has_children)
            .with_field("themes", owned(self.themes))
            .with_field("must_do_activities", owned(self.must_do_activities))
            .with_field("trip_pace", self.trip_pace)
            .with_field("activity_budget", self.activity_budget)
            .with_field("food_style", self.food_style)
            .with_field("dietary_requirements", owned(self.dietary_requirements))
            .with_field("proximity_preference", self.proximity_preference)
            .with_field("free_text", self.free_text)
            .with_field("children_clause", children_clause)
            .with_field("themes_text", self.themes.join(", "))
            .with_field("themes_list", bullets(self.themes))
            .with_field("must_do_text", self.must_do_activities.join(", "))
            .with_field("must_do_list", bullets(self.must_do_activities))
            .with_field("dietary_text", dietary_text)
            .with_field("dietary_list", dietary_list)
    }
}

/// Five Sydney trip requests with raw and presentation fields.
pub fn sydney_inputs() -> Vec<InputRecord> {
    let requests = [
        TripRequest {
            id: "luxury-couple",
            hotel_name: "Shangri-La Sydney",
            check_in_date: "2025-09-18",
            check_out_date: "2025-09-22",
            number_of_nights: 4,
            number_of_adults: 2,
            has_children: false,
            themes: &["culture", "food", "harbour views"],
            must_do_activities: &["climb Sydney Harbour Bridge", "dinner in The Rocks"],
            trip_pace: "balanced",
            activity_budget: "Open Wallet",
            food_style: "Only the Best",
            dietary_requirements: &[],
            proximity_preference: "See the best within reach",
            free_text: "early risers, keen on fine-dining with views",
        },
        TripRequest {
            id: "family",
            hotel_name: "The Langham, Sydney",
            check_in_date: "2025-12-05",
            check_out_date: "2025-12-09",
            number_of_nights: 4,
            number_of_adults: 2,
            has_children: true,
            themes: &["family", "beach", "exploration"],
            must_do_activities: &["Taronga Zoo visit", "ferry to Manly Beach"],
            trip_pace: "relaxed",
            activity_budget: "A Little Splash",
            food_style: "Casual Indulgence",
            dietary_requirements: &["nut allergy"],
            proximity_preference: "Keep it local",
            free_text: "travelling with a 6-year-old; need pram-friendly activities",
        },
        TripRequest {
            id: "couples-getaway",
            hotel_name: "QT Sydney",
            check_in_date: "2026-02-14",
            check_out_date: "2026-02-17",
            number_of_nights: 3,
            number_of_adults: 2,
            has_children: false,
            themes: &["shopping", "nightlife", "art"],
            must_do_activities: &["tour Art Gallery of NSW", "cocktails in Surry Hills"],
            trip_pace: "active",
            activity_budget: "Mix & Match",
            food_style: "Full-on Foodie",
            dietary_requirements: &["vegetarian"],
            proximity_preference: "Keen to get out and about",
            free_text: "couple’s getaway; love quirky design and hidden bars",
        },
        TripRequest {
            id: "solo-business",
            hotel_name: "Four Seasons Hotel Sydney",
            check_in_date: "2025-10-03",
            check_out_date: "2025-10-07",
            number_of_nights: 4,
            number_of_adults: 1,
            has_children: false,
            themes: &["business", "wellness", "culture"],
            must_do_activities: &[
                "morning walk in Royal Botanic Garden",
                "Sydney Opera House tour",
            ],
            trip_pace: "balanced",
            activity_budget: "Keep It Simple",
            food_style: "Keep It Simple",
            dietary_requirements: &["gluten-free"],
            proximity_preference: "See the best within reach",
            free_text: "solo work trip; interested in wellness classes after meetings",
        },
        TripRequest {
            id: "friends-group",
            hotel_name: "Ovolo Woolloomooloo",
            check_in_date: "2025-08-20",
            check_out_date: "2025-08-24",
            number_of_nights: 4,
            number_of_adults: 3,
            has_children: false,
            themes: &["adventure", "food", "nightlife"],
            must_do_activities: &["kayaking in Sydney Harbour", "pub crawl in Newtown"],
            trip_pace: "active",
            activity_budget: "Mix & Match",
            food_style: "Casual Indulgence",
            dietary_requirements: &[],
            proximity_preference: "Keen to get out and about",
            free_text: "group of friends; want craft-beer spots and live music",
        },
    ];
    requests.into_iter().map(TripRequest::into_record).collect()
}
