//! Vendored pattern tables for the scenario generator. Each scenario type
//! maps to a small set of threat-content fragments, a sender name pool,
//! and a risk-indicator list. Kept as plain data rather than loaded from
//! disk, since nobody edits these tables independently of the code that
//! reads them.

use dojo_shared::ScenarioType;

/// At least three fragments per type: easy mode concatenates exactly three.
#[must_use]
pub fn threat_fragments(t: ScenarioType) -> &'static [&'static str] {
    match t {
        ScenarioType::Grooming => &[
            "I feel like you're the only one who really gets me, this can be our secret",
            "You're so mature for your age, older friends understand you better than your parents",
            "Don't tell your mom and dad about our chats, they wouldn't understand",
            "Send me a picture so I know it's really you, I promise I won't show anyone",
        ],
        ScenarioType::Bullying => &[
            "Everyone at school thinks you're pathetic and nobody wants you around",
            "Just disappear already, literally nobody would even notice",
            "We made a whole group chat just to laugh at your pictures",
            "You should be embarrassed to even show your face tomorrow",
        ],
        ScenarioType::GamingScam => &[
            "I can double your in-game currency if you send me your account login",
            "This rare skin giveaway needs your account password to verify eligibility",
            "Trade me your items first and I'll send mine right after, trust me",
            "Click this link to claim your free battle pass before it expires tonight",
        ],
        ScenarioType::DangerousChallenge => &[
            "Everyone's doing the blackout challenge, film yourself and post it",
            "You just have to hold your breath until you pass out, it's harmless",
            "Take the pills together and see how long you can last, it's a dare",
            "Climb to the top of the tower for the clip, it'll go viral",
        ],
        ScenarioType::SelfHarm => &[
            "Nobody would miss you if you just stopped showing up tomorrow",
            "I've been thinking about ending it all, you're the only one I can tell",
            "The pain would finally stop if I just didn't wake up",
            "I already found a way to do it, I just need the courage now",
        ],
        ScenarioType::Phishing => &[
            "Your account has been suspended, verify your password here immediately",
            "We detected unusual activity, click this link to confirm your identity",
            "Your package could not be delivered, update your payment details now",
            "This is your bank, confirm your login credentials to avoid a freeze",
        ],
        ScenarioType::SeniorScam => &[
            "This is tech support, your computer has a virus, let me remote in",
            "You've won a prize but must pay a small processing fee to claim it",
            "Your Medicare benefits will be cancelled unless you confirm your SSN",
            "There's a warrant out for your arrest, pay this fine by gift card now",
        ],
        ScenarioType::RomanceScam => &[
            "I love you more than anyone, I just need a little help with an emergency",
            "My daughter is sick and I can't access my funds overseas right now",
            "We've never met but I feel a connection unlike anything before",
            "Once you wire the money we can finally be together forever",
        ],
        ScenarioType::GrandparentScam => &[
            "Grandma, it's me, I'm in jail and need bail money wired right away",
            "Please don't tell mom and dad, I got in an accident and need cash",
            "I lost my phone so this is a borrowed number, I need help urgently",
            "The lawyer will call you next to explain where to send the money",
        ],
        ScenarioType::UnauthorizedSpend => &[
            "I already charged your card for the subscription, just confirm the amount",
            "Your saved payment method was used for a one-time purchase just now",
            "This in-app purchase requires no further confirmation from you",
            "We auto-renewed your premium plan using the card on file",
        ],
        ScenarioType::LocationTracking => &[
            "Share your live location so I know you made it home safe tonight",
            "Turn on location sharing so I can always see where you are",
            "Just enable the tracker app, it's only so I can find you if needed",
            "Send me a pin of your exact location right now",
        ],
        ScenarioType::FakeFriendRequest => &[
            "Hey it's me again, I made a new account, add me back here",
            "My old account got hacked, this is my real one, let's reconnect",
            "I know we haven't talked in years but I really need a favor",
            "This is my cousin's account, she wants to be friends with you too",
        ],
        ScenarioType::Duress => &[
            "Do exactly as I say or your family will regret it",
            "If you tell anyone about this conversation there will be consequences",
            "You have one hour to send what I asked or I post everything",
            "I know where you live, just do what I'm asking and this ends",
        ],
        ScenarioType::SocialEngineering => &[
            "I'm calling from IT, I just need your password to fix the account",
            "This is a routine security check, please confirm your login details",
            "Your manager asked me to collect this information on their behalf",
            "We need to verify your identity before restoring access, share your code",
        ],
        ScenarioType::InappropriateContent => &[
            "Here's an image I don't think your parents would want you to see",
            "Let's talk about something your teachers would never approve of",
            "I found this video, you should really watch it alone",
            "This content is only for mature audiences, keep it between us",
        ],
    }
}

#[must_use]
pub fn opener(t: ScenarioType) -> &'static str {
    match t {
        ScenarioType::Grooming => "Hey, I've been wanting to talk to you privately.",
        ScenarioType::Bullying => "So everyone's been talking about you.",
        ScenarioType::GamingScam => "Good news, I found a way to boost your account.",
        ScenarioType::DangerousChallenge => "You have to try this with us.",
        ScenarioType::SelfHarm => "I need to tell someone how I've been feeling.",
        ScenarioType::Phishing => "This is an important account notice.",
        ScenarioType::SeniorScam => "This is an urgent call about your account.",
        ScenarioType::RomanceScam => "I've been waiting all day to talk to you.",
        ScenarioType::GrandparentScam => "It's me, please don't hang up.",
        ScenarioType::UnauthorizedSpend => "Just a quick note about your recent order.",
        ScenarioType::LocationTracking => "Quick favor, it's about safety.",
        ScenarioType::FakeFriendRequest => "Hey, long time no talk.",
        ScenarioType::Duress => "Listen carefully, this is serious.",
        ScenarioType::SocialEngineering => "This will only take a moment of your time.",
        ScenarioType::InappropriateContent => "I have something to show you.",
    }
}

pub const CONVERSATIONAL_CARRIERS: &[&str] = &[
    "So, {p}",
    "By the way, {p}",
    "Not to worry, but {p}",
    "Just between us, {p}",
    "Honestly though, {p}",
];

pub const FILLER_TOKENS: &[&str] = &["you know", "honestly", "like", "I mean", "kind of"];

#[must_use]
pub fn name_pool(t: ScenarioType) -> &'static [&'static str] {
    match t {
        ScenarioType::Grooming => &["Alex_92", "Jordan.k", "Sam_friendly"],
        ScenarioType::Bullying => &["anon_class", "HallwayVoice", "unknown_peer"],
        ScenarioType::GamingScam => &["ProTrader99", "SkinGiveawayHQ", "BoostKing"],
        ScenarioType::DangerousChallenge => &["ChallengeCrew", "ViralDareZone", "TrendSquad"],
        ScenarioType::SelfHarm => &["quiet_friend", "night_owl_22", "lonelyvoice"],
        ScenarioType::Phishing => &["Account-Security", "Support-Team", "Billing-Dept"],
        ScenarioType::SeniorScam => &["TechSupportLine", "MedicareDept", "CourtClerkOffice"],
        ScenarioType::RomanceScam => &["DreamPartner88", "OverseasLove", "TrueHeart_22"],
        ScenarioType::GrandparentScam => &["Unknown Caller", "Grandchild (new number)", "Family Emergency"],
        ScenarioType::UnauthorizedSpend => &["Billing-Notice", "Store-Receipts", "Subscription-Desk"],
        ScenarioType::LocationTracking => &["ConcernedFriend", "SafetyCheckApp", "FamilyLocator"],
        ScenarioType::FakeFriendRequest => &["OldFriend_New", "ReconnectRequest", "Cousin_Account2"],
        ScenarioType::Duress => &["Unknown Number", "Private Caller", "Blocked Sender"],
        ScenarioType::SocialEngineering => &["IT-Helpdesk", "Manager-Assistant", "Security-Verify"],
        ScenarioType::InappropriateContent => &["Anon_Sender", "Unknown_Contact", "NewFollower_x"],
    }
}

#[must_use]
pub fn risk_indicators(t: ScenarioType) -> &'static [&'static str] {
    match t {
        ScenarioType::Grooming => &["requests_secrecy", "age_inappropriate_flattery", "requests_image"],
        ScenarioType::Bullying => &["anonymous_sender", "coordinated_group"],
        ScenarioType::GamingScam => &["requests_credentials", "urgency_language"],
        ScenarioType::DangerousChallenge => &["peer_pressure_language", "physical_risk"],
        ScenarioType::SelfHarm => &["hopelessness_language", "plan_language"],
        ScenarioType::Phishing => &["impersonates_institution", "urgency_language", "requests_credentials"],
        ScenarioType::SeniorScam => &["impersonates_authority", "requests_payment", "urgency_language"],
        ScenarioType::RomanceScam => &["never_met_in_person", "requests_money", "overseas_excuse"],
        ScenarioType::GrandparentScam => &["impersonates_family", "requests_secrecy", "requests_payment"],
        ScenarioType::UnauthorizedSpend => &["unconfirmed_charge", "saved_payment_used"],
        ScenarioType::LocationTracking => &["requests_live_location", "persistent_tracking"],
        ScenarioType::FakeFriendRequest => &["duplicate_identity", "requests_reconnection"],
        ScenarioType::Duress => &["threat_language", "coercion_language"],
        ScenarioType::SocialEngineering => &["impersonates_staff", "requests_credentials"],
        ScenarioType::InappropriateContent => &["explicit_content_flag", "requests_secrecy"],
    }
}

/// Benign message templates, keyed by who the message is addressed to.
#[must_use]
pub fn benign_templates(profile: dojo_shared::ProfileType) -> &'static [&'static str] {
    use dojo_shared::ProfileType;
    match profile {
        ProfileType::Child => &[
            "Hey want to study together this weekend?",
            "Did you finish the homework for tomorrow?",
            "Are you coming to the birthday party on Saturday?",
            "Can you send me the notes from class today?",
        ],
        ProfileType::Senior => &[
            "Hi Grandma, just checking in, how was your doctor's appointment?",
            "Thanks for the recipe you sent, it turned out great!",
            "Would you like to join us for dinner this Sunday?",
            "Here are the photos from the family reunion last week.",
        ],
        ProfileType::FamilyAdmin => &[
            "The school newsletter is attached for this month.",
            "Reminder: parent-teacher conferences are next Tuesday.",
            "Here's the updated carpool schedule for the week.",
            "The community center posted the new activity calendar.",
        ],
    }
}

#[must_use]
pub fn platforms() -> &'static [&'static str] {
    &["Messenger", "SMS", "Discord", "Instagram DM", "Email", "WhatsApp"]
}
