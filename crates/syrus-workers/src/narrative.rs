//! User-facing narrative copy (spec §7: "an established voice... specific
//! wording is informative, not normative"). Centralized so every stage emits
//! the same register rather than ad-hoc strings.

pub fn already_has_campaign() -> &'static str {
    "The threads of this channel are already woven into a campaign. End it before starting anew."
}

pub fn invalid_campaign_type() -> &'static str {
    "I don't recognize that shape of campaign. Choose short, long, or epic."
}

pub fn invalid_decision_model() -> &'static str {
    "I don't recognize that decision-making model. Choose host, flexible, or group."
}

pub fn casting(campaign_type: &str) -> String {
    format!("The threads gather. A {campaign_type} campaign begins its casting...")
}

pub fn confirm_end() -> &'static str {
    "Ending a campaign unravels it for good. Confirm within the next minute if this is truly the end."
}

pub fn no_pending_confirmation() -> &'static str {
    "I sense no unraveling in motion. There is nothing waiting to be confirmed."
}

pub fn campaign_ended() -> &'static str {
    "The threads are cut. This campaign has ended."
}

pub fn no_campaign_here() -> &'static str {
    "I sense no campaign here. Start one before asking anything more of me."
}

pub fn seed_selection_failed() -> &'static str {
    "The threads blur and tangle, refusing to settle into a shape. Try again shortly."
}

pub fn blueprint_vendor_failure() -> &'static str {
    "The weave resists me; the vision would not come clear this time."
}

pub fn blueprint_validation_failed() -> &'static str {
    "What came back was not a whole vision, only fragments. I must try again."
}

pub fn play_campaign_not_active(status: &str) -> String {
    format!("There is nothing to declare yet; this campaign is still {status}.")
}

pub fn play_campaign_paused() -> &'static str {
    "The weave is paused. Nothing moves until it resumes."
}

pub fn weave_listens() -> &'static str {
    "The weave listens now."
}

pub fn howto_instructions() -> &'static str {
    "Use `/syrus declare` to act. Your words shape what happens next."
}

pub fn play_missing_declare() -> &'static str {
    "I caught no words to act on. Declare what you do."
}

pub fn play_turn_reply(primary_area: &str, declare: &str) -> String {
    format!("In {primary_area}, you {declare}. The weave takes note and waits to see what follows.")
}
