//! Curated bidirectional table of formal first names and their common
//! nicknames/diminutives.

use fxhash::FxHashMap;
use once_cell::sync::Lazy;

/// Formal name followed by its diminutives. Lookup works in both
/// directions and across siblings ("bob" <-> "rob" via "robert").
const NAME_FAMILIES: &[&[&str]] = &[
    &["michael", "mike", "mikey", "mick"],
    &["william", "will", "bill", "billy", "liam"],
    &["robert", "rob", "bob", "bobby", "bert"],
    &["richard", "rick", "ricky", "rich", "dick"],
    &["james", "jim", "jimmy", "jamie"],
    &["john", "jack", "johnny", "jon"],
    &["jonathan", "jon", "jonny", "nathan"],
    &["charles", "charlie", "chuck", "chas"],
    &["christopher", "chris", "topher", "kit"],
    &["daniel", "dan", "danny"],
    &["matthew", "matt", "matty"],
    &["nicholas", "nick", "nicky", "cole"],
    &["anthony", "tony", "ant"],
    &["alexander", "alex", "xander", "sasha", "lex"],
    &["andrew", "andy", "drew"],
    &["benjamin", "ben", "benny", "benji"],
    &["samuel", "sam", "sammy"],
    &["joseph", "joe", "joey"],
    &["thomas", "tom", "tommy"],
    &["edward", "ed", "eddie", "ted", "ned"],
    &["david", "dave", "davey"],
    &["steven", "steve", "stevie"],
    &["stephen", "steve", "stevie"],
    &["zachary", "zach", "zack"],
    &["timothy", "tim", "timmy"],
    &["gregory", "greg"],
    &["jeffrey", "jeff"],
    &["joshua", "josh"],
    &["jacob", "jake"],
    &["nathaniel", "nate", "nathan"],
    &["raymond", "ray"],
    &["lawrence", "larry"],
    &["ronald", "ron", "ronnie"],
    &["kenneth", "ken", "kenny"],
    &["donald", "don", "donny"],
    &["frederick", "fred", "freddie"],
    &["theodore", "theo", "ted", "teddy"],
    &["francis", "frank", "frankie"],
    &["gerald", "jerry"],
    &["douglas", "doug"],
    &["vincent", "vince", "vinny"],
    &["leonard", "leo", "lenny"],
    &["martin", "marty"],
    &["arthur", "art", "artie"],
    &["albert", "al", "bert"],
    &["eugene", "gene"],
    &["harold", "harry", "hal"],
    &["henry", "hank", "harry"],
    &["walter", "walt", "wally"],
    &["russell", "russ", "rusty"],
    &["randall", "randy"],
    &["bradley", "brad"],
    &["philip", "phil"],
    &["peter", "pete"],
    &["patrick", "pat", "paddy"],
    &["gabriel", "gabe"],
    &["elizabeth", "liz", "beth", "eliza", "lizzie", "betty", "libby"],
    &["katherine", "kate", "katie", "kathy", "kat"],
    &["catherine", "cat", "cathy", "kate"],
    &["jennifer", "jen", "jenny"],
    &["jessica", "jess", "jessie"],
    &["samantha", "sam", "sammy"],
    &["rebecca", "becca", "becky"],
    &["stephanie", "steph"],
    &["margaret", "maggie", "meg", "peggy", "marge"],
    &["patricia", "pat", "patty", "trish", "tricia"],
    &["victoria", "vicky", "tori"],
    &["abigail", "abby", "gail"],
    &["gabrielle", "gabby", "brielle"],
    &["amanda", "mandy"],
    &["susan", "sue", "susie"],
    &["deborah", "deb", "debbie"],
    &["barbara", "barb", "babs"],
    &["kimberly", "kim"],
    &["michelle", "shelly"],
    &["christina", "chris", "christy", "tina"],
    &["christine", "chris", "chrissy", "tina"],
    &["cynthia", "cindy"],
    &["pamela", "pam"],
    &["sandra", "sandy"],
    &["dorothy", "dot", "dottie"],
    &["virginia", "ginny"],
    &["eleanor", "ellie", "nora"],
    &["isabella", "izzy", "bella"],
    &["olivia", "liv", "livvy"],
    &["sophia", "sophie"],
    &["charlotte", "charlie", "lottie"],
    &["penelope", "penny"],
    &["veronica", "ronnie"],
    &["angela", "angie"],
    &["angelica", "angie"],
    &["melissa", "mel", "missy"],
    &["melanie", "mel"],
    &["vanessa", "nessa"],
    &["cassandra", "cass", "cassie"],
    &["alexandra", "alex", "lexi", "sandra"],
    &["danielle", "dani"],
    &["natalie", "nat"],
    &["natasha", "nat", "tasha"],
    &["valentina", "val", "tina"],
    &["valerie", "val"],
];

static VARIANTS: Lazy<FxHashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut map: FxHashMap<&'static str, Vec<&'static str>> = FxHashMap::default();
    for family in NAME_FAMILIES {
        for &name in *family {
            let entry = map.entry(name).or_default();
            for &other in *family {
                if other != name && !entry.contains(&other) {
                    entry.push(other);
                }
            }
        }
    }
    map
});

/// All known variants of `name` (nicknames of a formal name, formal names
/// of a nickname, and sibling nicknames). Empty when the name is unknown.
pub fn variants(name: &str) -> &'static [&'static str] {
    VARIANTS
        .get(name.to_ascii_lowercase().as_str())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// True when the two first names are the same or related through the table.
pub fn are_variants(a: &str, b: &str) -> bool {
    let a = a.to_ascii_lowercase();
    let b = b.to_ascii_lowercase();
    if a == b {
        return true;
    }
    variants(&a).contains(&b.as_str())
}
