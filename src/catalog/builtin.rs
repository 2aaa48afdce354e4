//! Built-in component kinds.
//!
//! Ratings and forward voltages here are typical hobby-part values. Every one
//! of them is an ordinary parameter default, so a description can override it
//! per component.

use super::spec::{
    Classification, ComponentSpec, CurrentConvention, DcModel, ParamSpec, TerminalSpec, Terminals,
};

const PLUS: &[&str] = &["+", "p", "positive", "plus", "vcc"];
const MINUS: &[&str] = &["-", "n", "negative", "minus", "gnd"];
const START: &[&str] = &["a", "in", "left", "top"];
const END: &[&str] = &["b", "out", "right", "bottom"];
const ANODE: &[&str] = &["a", "+", "p", "positive", "long"];
const CATHODE: &[&str] = &["k", "c", "-", "n", "negative", "short"];

fn two_pin(first: (&'static str, &'static [&'static str]), second: (&'static str, &'static [&'static str])) -> Terminals {
    Terminals::Fixed(vec![
        TerminalSpec::new(first.0, first.1),
        TerminalSpec::new(second.0, second.1),
    ])
}

fn placeholder(
    name: &'static str,
    aliases: &'static [&'static str],
    prefix: &'static str,
    description: &'static str,
    terminals: Terminals,
    params: Vec<ParamSpec>,
) -> ComponentSpec {
    ComponentSpec {
        name,
        aliases,
        prefix,
        description,
        classification: Classification::Control,
        model: DcModel::Open,
        terminals,
        params,
        rated_current_param: None,
        power_rating_param: None,
        nominal_current: 0.01,
        requires_current_limit: false,
        convention: CurrentConvention::FirstToSecond,
    }
}

/// All built-in kinds, in the order they are listed to users.
pub(super) fn builtin_specs() -> Vec<ComponentSpec> {
    vec![
        ComponentSpec {
            name: "battery",
            aliases: &["cell", "voltage_source", "dc_source", "power"],
            prefix: "V",
            description: "Battery",
            classification: Classification::Source,
            model: DcModel::VoltageSource,
            terminals: two_pin(("pos", PLUS), ("neg", MINUS)),
            params: vec![ParamSpec::required("voltage", "V").positive().at_most(1000.0).primary()],
            rated_current_param: None,
            power_rating_param: None,
            nominal_current: 0.1,
            requires_current_limit: false,
            convention: CurrentConvention::OutOfPositive,
        },
        ComponentSpec {
            name: "resistor",
            aliases: &["res"],
            prefix: "R",
            description: "Carbon film resistor",
            classification: Classification::Passive,
            model: DcModel::Resistance,
            terminals: two_pin(("start", START), ("end", END)),
            params: vec![
                ParamSpec::required("resistance", "Ω").positive().primary(),
                ParamSpec::optional("power_rating", "W", 0.25).positive(),
            ],
            rated_current_param: None,
            power_rating_param: Some("power_rating"),
            nominal_current: 0.02,
            requires_current_limit: false,
            convention: CurrentConvention::FirstToSecond,
        },
        ComponentSpec {
            name: "potentiometer",
            aliases: &["pot", "trimmer", "variable_resistor"],
            prefix: "RV",
            description: "Rotary potentiometer",
            classification: Classification::Passive,
            model: DcModel::Divider,
            terminals: Terminals::Fixed(vec![
                TerminalSpec::new("start", START),
                TerminalSpec::new("wiper", &["w", "middle", "center"]),
                TerminalSpec::new("end", END),
            ]),
            params: vec![
                ParamSpec::optional("resistance", "Ω", 10_000.0).positive().primary(),
                ParamSpec::optional("position", "", 0.5).range(0.0, 1.0),
                ParamSpec::optional("power_rating", "W", 0.5).positive(),
            ],
            rated_current_param: None,
            power_rating_param: Some("power_rating"),
            nominal_current: 0.01,
            requires_current_limit: false,
            convention: CurrentConvention::FirstToSecond,
        },
        ComponentSpec {
            name: "led",
            aliases: &["light_emitting_diode"],
            prefix: "LED",
            description: "5mm LED",
            classification: Classification::NonLinear,
            model: DcModel::ForwardDrop,
            terminals: two_pin(("anode", ANODE), ("cathode", CATHODE)),
            params: vec![
                ParamSpec::optional("forward_voltage", "V", 2.0).range(1.5, 3.5).primary(),
                ParamSpec::optional("max_current", "A", 0.020).positive(),
                ParamSpec::optional("on_resistance", "Ω", 1e-3).positive(),
            ],
            rated_current_param: Some("max_current"),
            power_rating_param: None,
            nominal_current: 0.020,
            requires_current_limit: true,
            convention: CurrentConvention::FirstToSecond,
        },
        ComponentSpec {
            name: "diode",
            aliases: &["rectifier"],
            prefix: "D",
            description: "Silicon rectifier diode",
            classification: Classification::NonLinear,
            model: DcModel::ForwardDrop,
            terminals: two_pin(("anode", ANODE), ("cathode", CATHODE)),
            params: vec![
                ParamSpec::optional("forward_voltage", "V", 0.7).range(0.1, 1.5).primary(),
                ParamSpec::optional("max_current", "A", 1.0).positive(),
                ParamSpec::optional("on_resistance", "Ω", 1e-3).positive(),
            ],
            rated_current_param: Some("max_current"),
            power_rating_param: None,
            nominal_current: 1.0,
            requires_current_limit: false,
            convention: CurrentConvention::FirstToSecond,
        },
        ComponentSpec {
            name: "capacitor",
            aliases: &["cap"],
            prefix: "C",
            description: "Ceramic capacitor",
            classification: Classification::Passive,
            model: DcModel::Open,
            terminals: two_pin(("start", START), ("end", END)),
            params: vec![ParamSpec::optional("capacitance", "F", 1e-6).positive().primary()],
            rated_current_param: None,
            power_rating_param: None,
            nominal_current: 0.01,
            requires_current_limit: false,
            convention: CurrentConvention::FirstToSecond,
        },
        ComponentSpec {
            name: "inductor",
            aliases: &["coil", "choke"],
            prefix: "L",
            description: "Wirewound inductor",
            classification: Classification::Passive,
            model: DcModel::Wire,
            terminals: two_pin(("start", START), ("end", END)),
            params: vec![
                ParamSpec::optional("inductance", "H", 1e-3).positive().primary(),
                ParamSpec::optional("dc_resistance", "Ω", 0.01).positive(),
            ],
            rated_current_param: None,
            power_rating_param: None,
            nominal_current: 0.1,
            requires_current_limit: false,
            convention: CurrentConvention::FirstToSecond,
        },
        ComponentSpec {
            name: "switch",
            aliases: &["button", "push_button", "toggle"],
            prefix: "SW",
            description: "SPST switch",
            classification: Classification::Control,
            model: DcModel::Switch,
            terminals: two_pin(("start", START), ("end", END)),
            params: vec![
                ParamSpec::optional("closed", "", 1.0).range(0.0, 1.0).integer().primary(),
                ParamSpec::optional("contact_resistance", "Ω", 0.01).positive(),
                ParamSpec::optional("max_current", "A", 2.0).positive(),
            ],
            rated_current_param: Some("max_current"),
            power_rating_param: None,
            nominal_current: 2.0,
            requires_current_limit: false,
            convention: CurrentConvention::FirstToSecond,
        },
        ComponentSpec {
            name: "buzzer",
            aliases: &["piezo", "speaker"],
            prefix: "BZ",
            description: "Active buzzer",
            classification: Classification::Passive,
            model: DcModel::Resistance,
            terminals: two_pin(("pos", PLUS), ("neg", MINUS)),
            params: vec![
                ParamSpec::optional("resistance", "Ω", 100.0).positive().primary(),
                ParamSpec::optional("max_current", "A", 0.03).positive(),
            ],
            rated_current_param: Some("max_current"),
            power_rating_param: None,
            nominal_current: 0.03,
            requires_current_limit: false,
            convention: CurrentConvention::FirstToSecond,
        },
        ComponentSpec {
            name: "motor",
            aliases: &["dc_motor", "fan"],
            prefix: "M",
            description: "Hobby DC motor",
            classification: Classification::Passive,
            model: DcModel::Resistance,
            terminals: two_pin(("pos", PLUS), ("neg", MINUS)),
            params: vec![
                ParamSpec::optional("resistance", "Ω", 10.0).positive().primary(),
                ParamSpec::optional("max_current", "A", 0.5).positive(),
            ],
            rated_current_param: Some("max_current"),
            power_rating_param: None,
            nominal_current: 0.5,
            requires_current_limit: false,
            convention: CurrentConvention::FirstToSecond,
        },
        placeholder(
            "ic",
            &["chip", "op_amp", "opamp", "voltage_reg", "regulator", "microcontroller"],
            "U",
            "Integrated circuit",
            Terminals::Numbered { count_param: "pins" },
            vec![ParamSpec::optional("pins", "", 8.0).range(2.0, 64.0).integer()],
        ),
        placeholder(
            "transistor",
            &["bjt", "npn", "pnp"],
            "Q",
            "Bipolar transistor",
            Terminals::Fixed(vec![
                TerminalSpec::new("collector", &["c"]),
                TerminalSpec::new("base", &["b"]),
                TerminalSpec::new("emitter", &["e"]),
            ]),
            Vec::new(),
        ),
        placeholder(
            "mosfet",
            &["fet", "nmos", "pmos"],
            "Q",
            "MOSFET",
            Terminals::Fixed(vec![
                TerminalSpec::new("drain", &["d"]),
                TerminalSpec::new("gate", &["g"]),
                TerminalSpec::new("source", &["s"]),
            ]),
            Vec::new(),
        ),
    ]
}
