/// Every building, residence hall and point of interest on the survey map.
pub const CAMPUS_BUILDINGS: [(&str, &str); 45] = [
    ("Sports and Recreation Center", "building"),
    ("Harrington Auditorium", "building"),
    ("Foisie Innovation Center", "building"),
    ("Messenger", "residenceHall"),
    ("Higgins Labs", "building"),
    ("Stratton Hall", "building"),
    ("Washburn Shops", "building"),
    ("Boynton Hall", "building"),
    ("Gordon Library", "building"),
    ("IGSD", "building"),
    ("Salisbury Laboratories", "building"),
    ("Fountain", "poi"),
    ("Rubin Campus Center", "building"),
    ("Olin Hall", "building"),
    ("Fuller Laboratories", "building"),
    ("Kaven Hall", "building"),
    ("Atwater Kent Laboratories", "building"),
    ("Goddard Hall", "building"),
    ("Higgins House", "building"),
    ("Campus Center Lawn", "poi"),
    ("Higgins Lawn", "poi"),
    ("Salisbury Lawn", "poi"),
    ("The Quad", "poi"),
    ("Morgan Hall", "residenceHall"),
    ("Daniels Hall", "residenceHall"),
    ("Sanford Riley Hall", "residenceHall"),
    ("Alden Memorial", "building"),
    ("East Hall", "residenceHall"),
    ("Founders Hall", "residenceHall"),
    ("Institute Hall", "residenceHall"),
    ("Stoddard Complex", "residenceHall"),
    ("Faraday Hall", "residenceHall"),
    ("Bartlett Center", "building"),
    ("The Wedge", "poi"),
    ("Pulse On Dining (DAKA)", "poi"),
    ("Dunkin Donuts", "poi"),
    ("CC Couch Room", "poi"),
    ("CC Dining Area", "poi"),
    ("Library Cafe", "poi"),
    ("Goat's Head", "poi"),
    ("Atwater Kent Lounge", "poi"),
    ("Foisie Lounge Area", "poi"),
    ("Gateway Park", "building"),
    ("Gateway Park I", "building"),
    ("Gateway Park II", "building"),
];
