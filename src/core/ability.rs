//! Card abilities and the ability-text parser
//!
//! Ability text is parsed once, when a card definition is adapted from the
//! catalog. Text the grammar does not recognise is kept as
//! `AbilityEffect::Unparsed` and only logged when it resolves.

use crate::core::{CardKind, ElementCost};
use crate::EngineError;
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map, map_res, opt, value},
    sequence::{preceded, terminated, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A numeric amount in ability text: a literal or the `X` placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Amount {
    Fixed(u32),
    X,
}

impl Amount {
    /// Substitute the play parameter for `X`
    pub fn resolve(&self, x: u32) -> u32 {
        match self {
            Amount::Fixed(n) => *n,
            Amount::X => x,
        }
    }
}

/// Which enemy Familiars a removal effect hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyScope {
    Each,
    /// Lowest remaining health; the first in zone order on ties
    Weakest,
    /// Highest strength; the first in zone order on ties
    Strongest,
}

/// The kind of card a deck search looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchFilter {
    Any,
    Familiar,
    Spell,
    Azoth,
    Flag,
}

impl SearchFilter {
    pub fn matches(&self, kind: &CardKind) -> bool {
        match self {
            SearchFilter::Any => true,
            SearchFilter::Familiar => matches!(kind, CardKind::Familiar { .. }),
            SearchFilter::Spell => matches!(kind, CardKind::Spell { .. }),
            SearchFilter::Azoth => matches!(kind, CardKind::Azoth),
            SearchFilter::Flag => matches!(kind, CardKind::Flag),
        }
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchFilter::Any => "card",
            SearchFilter::Familiar => "Familiar",
            SearchFilter::Spell => "Spell",
            SearchFilter::Azoth => "Azoth card",
            SearchFilter::Flag => "Flag",
        };
        write!(f, "{name}")
    }
}

/// Game events a triggered ability can listen for
///
/// Phase events reach every card on either player's field and both Flags.
/// Card events reach only the card involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerEvent {
    TurnStart,
    MainPhaseStart,
    CombatPhaseStart,
    PostCombatPhaseStart,
    TurnEnd,
    AfterCombat,
    OnSummon,
    OnAttack,
    OnBlock,
    BeforeDamage,
    OnDestroy,
}

impl TriggerEvent {
    pub const ALL: [TriggerEvent; 11] = [
        TriggerEvent::TurnStart,
        TriggerEvent::MainPhaseStart,
        TriggerEvent::CombatPhaseStart,
        TriggerEvent::PostCombatPhaseStart,
        TriggerEvent::TurnEnd,
        TriggerEvent::AfterCombat,
        TriggerEvent::OnSummon,
        TriggerEvent::OnAttack,
        TriggerEvent::OnBlock,
        TriggerEvent::BeforeDamage,
        TriggerEvent::OnDestroy,
    ];

    /// Name used in card data
    pub fn name(&self) -> &'static str {
        match self {
            TriggerEvent::TurnStart => "turnStart",
            TriggerEvent::MainPhaseStart => "mainPhaseStart",
            TriggerEvent::CombatPhaseStart => "combatPhaseStart",
            TriggerEvent::PostCombatPhaseStart => "postCombatPhaseStart",
            TriggerEvent::TurnEnd => "turnEnd",
            TriggerEvent::AfterCombat => "afterCombat",
            TriggerEvent::OnSummon => "onSummon",
            TriggerEvent::OnAttack => "onAttack",
            TriggerEvent::OnBlock => "onBlock",
            TriggerEvent::BeforeDamage => "beforeDamage",
            TriggerEvent::OnDestroy => "onDestroy",
        }
    }
}

impl FromStr for TriggerEvent {
    type Err = EngineError;

    /// Accepts the card-data names in any case, with or without spaces,
    /// plus a few plain-English forms such as "when summoned".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        if let Some(event) = TriggerEvent::ALL
            .iter()
            .find(|e| e.name().eq_ignore_ascii_case(&key))
        {
            return Ok(*event);
        }
        match key.as_str() {
            "whensummoned" | "summon" => Ok(TriggerEvent::OnSummon),
            "whenattacking" | "whenthisattacks" | "attack" => Ok(TriggerEvent::OnAttack),
            "whenblocking" | "whenthisblocks" | "block" => Ok(TriggerEvent::OnBlock),
            "whendestroyed" | "dies" | "destroyed" => Ok(TriggerEvent::OnDestroy),
            "startofturn" | "atthestartofyourturn" => Ok(TriggerEvent::TurnStart),
            "endofturn" | "attheendofyourturn" => Ok(TriggerEvent::TurnEnd),
            _ => Err(EngineError::ParseError(format!("unknown trigger: {s}"))),
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What an ability does when it resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// "Deal X damage to opponent"
    DamageOpponent(Amount),
    /// "Deal X damage to each enemy Familiar"
    DamageEnemyFamiliars(Amount),
    /// "Draw X cards"
    DrawCards(Amount),
    /// "Put X +1 counters on each Familiar you control"
    AddCounters(Amount),
    /// "Familiars you control get +X strength until end of turn"
    EmpowerFamiliars(Amount),
    /// "Gain X life" / "Heal X"
    Heal(Amount),
    /// "Destroy the weakest enemy Familiar"
    Destroy(EnemyScope),
    /// "Return each enemy Familiar to its owner's hand"
    ReturnToHand(EnemyScope),
    /// "Banish the strongest enemy Familiar" / "Remove ... from the game"
    Banish(EnemyScope),
    /// "Search your deck for a Spell": the topmost match goes to hand and
    /// the deck is shuffled
    Search(SearchFilter),
    /// Free text with no engine semantics
    Unparsed(String),
}

impl AbilityEffect {
    pub fn uses_placeholder(&self) -> bool {
        matches!(
            self,
            AbilityEffect::DamageOpponent(Amount::X)
                | AbilityEffect::DamageEnemyFamiliars(Amount::X)
                | AbilityEffect::DrawCards(Amount::X)
                | AbilityEffect::AddCounters(Amount::X)
                | AbilityEffect::EmpowerFamiliars(Amount::X)
                | AbilityEffect::Heal(Amount::X)
        )
    }
}

/// One entry of a card's ordered ability list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub text: String,
    /// Activation cost, for abilities used from the field
    pub cost: Option<ElementCost>,
    /// Trigger condition; triggered abilities cannot be activated
    pub trigger: Option<String>,
    /// The event `trigger` names, when it names one the engine knows
    pub event: Option<TriggerEvent>,
    pub effect: AbilityEffect,
}

impl Ability {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let effect = parse_effect(&text);
        Ability {
            text,
            cost: None,
            trigger: None,
            event: None,
            effect,
        }
    }

    pub fn with_cost(mut self, cost: ElementCost) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        let trigger = trigger.into();
        self.event = trigger.parse().ok();
        self.trigger = Some(trigger);
        self
    }

    /// Fires automatically on `event`
    pub fn listens_for(&self, event: TriggerEvent) -> bool {
        self.event == Some(event)
    }

    /// Has a cost and no trigger: can be activated from the field
    pub fn is_activated(&self) -> bool {
        self.cost.is_some() && self.trigger.is_none()
    }

    /// Ability text with the placeholder replaced by `x`
    pub fn describe(&self, x: u32) -> String {
        substitute_placeholder(&self.text, x)
    }
}

/// Replace every standalone `X` in `text` with `value`
pub fn substitute_placeholder(text: &str, value: u32) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        let before_ok = i == 0 || !chars[i - 1].is_alphanumeric();
        let after_ok = chars.get(i + 1).map_or(true, |n| !n.is_alphanumeric());
        if *c == 'X' && before_ok && after_ok {
            out.push_str(&value.to_string());
        } else {
            out.push(*c);
        }
    }
    out
}

/// Parse ability text into an effect, falling back to `Unparsed`
pub fn parse_effect(text: &str) -> AbilityEffect {
    let trailer = tuple((multispace0, opt(char('.')), multispace0));
    match all_consuming(terminated(effect, trailer))(text) {
        Ok((_, parsed)) => parsed,
        Err(_) => AbilityEffect::Unparsed(text.trim().to_string()),
    }
}

fn word<'a>(w: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag_no_case(w))
}

fn amount(i: &str) -> IResult<&str, Amount> {
    preceded(
        multispace0,
        alt((
            value(Amount::X, tag_no_case("x")),
            map_res(digit1, |d: &str| d.parse::<u32>().map(Amount::Fixed)),
            value(Amount::Fixed(1), alt((tag_no_case("an"), tag_no_case("a")))),
        )),
    )(i)
}

fn familiars(i: &str) -> IResult<&str, &str> {
    alt((word("familiars"), word("familiar")))(i)
}

fn damage(i: &str) -> IResult<&str, AbilityEffect> {
    let (i, n) = preceded(word("deal"), amount)(i)?;
    let (i, _) = tuple((word("damage"), word("to")))(i)?;
    alt((
        map(tuple((word("each"), word("enemy"), familiars)), move |_| {
            AbilityEffect::DamageEnemyFamiliars(n)
        }),
        map(
            tuple((
                opt(alt((word("your"), word("target"), word("the")))),
                alt((word("opponent"), word("player"))),
            )),
            move |_| AbilityEffect::DamageOpponent(n),
        ),
    ))(i)
}

fn draw(i: &str) -> IResult<&str, AbilityEffect> {
    map(
        tuple((word("draw"), amount, alt((word("cards"), word("card"))))),
        |(_, n, _)| AbilityEffect::DrawCards(n),
    )(i)
}

fn counters(i: &str) -> IResult<&str, AbilityEffect> {
    map(
        tuple((
            word("put"),
            amount,
            word("+1"),
            alt((word("counters"), word("counter"))),
            word("on"),
            word("each"),
            familiars,
            word("you"),
            word("control"),
        )),
        |(_, n, ..)| AbilityEffect::AddCounters(n),
    )(i)
}

fn empower(i: &str) -> IResult<&str, AbilityEffect> {
    map(
        tuple((
            familiars,
            word("you"),
            word("control"),
            word("get"),
            word("+"),
            amount,
            word("strength"),
            word("until"),
            word("end"),
            word("of"),
            word("turn"),
        )),
        |(_, _, _, _, _, n, ..)| AbilityEffect::EmpowerFamiliars(n),
    )(i)
}

fn heal(i: &str) -> IResult<&str, AbilityEffect> {
    alt((
        map(tuple((word("gain"), amount, word("life"))), |(_, n, _)| {
            AbilityEffect::Heal(n)
        }),
        map(preceded(word("heal"), amount), AbilityEffect::Heal),
    ))(i)
}

fn enemy_familiars(i: &str) -> IResult<&str, ()> {
    value((), tuple((word("enemy"), familiars)))(i)
}

fn enemy_scope(i: &str) -> IResult<&str, EnemyScope> {
    alt((
        value(
            EnemyScope::Each,
            tuple((alt((word("each"), word("all"))), enemy_familiars)),
        ),
        value(
            EnemyScope::Weakest,
            tuple((word("the"), word("weakest"), enemy_familiars)),
        ),
        value(
            EnemyScope::Strongest,
            tuple((word("the"), word("strongest"), enemy_familiars)),
        ),
    ))(i)
}

fn destroy(i: &str) -> IResult<&str, AbilityEffect> {
    map(preceded(word("destroy"), enemy_scope), AbilityEffect::Destroy)(i)
}

fn return_to_hand(i: &str) -> IResult<&str, AbilityEffect> {
    map(
        tuple((
            word("return"),
            enemy_scope,
            word("to"),
            alt((word("its"), word("their"))),
            alt((word("owners'"), word("owner's"))),
            alt((word("hands"), word("hand"))),
        )),
        |(_, scope, ..)| AbilityEffect::ReturnToHand(scope),
    )(i)
}

fn banish(i: &str) -> IResult<&str, AbilityEffect> {
    alt((
        map(preceded(word("banish"), enemy_scope), AbilityEffect::Banish),
        map(
            tuple((word("remove"), enemy_scope, word("from"), word("the"), word("game"))),
            |(_, scope, ..)| AbilityEffect::Banish(scope),
        ),
    ))(i)
}

fn search_filter(i: &str) -> IResult<&str, SearchFilter> {
    let kind = alt((
        value(SearchFilter::Familiar, word("familiar")),
        value(SearchFilter::Spell, word("spell")),
        value(SearchFilter::Azoth, word("azoth")),
        value(SearchFilter::Flag, word("flag")),
    ));
    alt((
        value(SearchFilter::Any, word("card")),
        terminated(kind, opt(word("card"))),
    ))(i)
}

fn search(i: &str) -> IResult<&str, AbilityEffect> {
    map(
        tuple((
            word("search"),
            word("your"),
            word("deck"),
            word("for"),
            alt((word("an"), word("a"))),
            search_filter,
        )),
        |(.., filter)| AbilityEffect::Search(filter),
    )(i)
}

fn effect(i: &str) -> IResult<&str, AbilityEffect> {
    alt((
        damage,
        draw,
        counters,
        empower,
        heal,
        destroy,
        return_to_hand,
        banish,
        search,
    ))(i)
}
