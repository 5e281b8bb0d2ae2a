//! 7-Zip technical listing fixtures

/// `7z l -slt` output for an archive with one top-level directory
pub const DOCS_ZIP_SLT: &str = "\
7-Zip 23.01 (x64) : Copyright (c) 1999-2023 Igor Pavlov : 2023-06-20

Listing archive: /data/docs.zip

--
Path = /data/docs.zip
Type = zip
Physical Size = 2048

----------
Path = docs/guide/intro.md
Folder = -
Size = 120
Modified = 2024-03-01 12:00:05
Attributes = A

Path = docs/guide
Folder = +
Size = 0
Modified = 2024-03-01 12:00:00
Attributes = D

Path = docs/readme.txt
Folder = -
Size = 12
Modified = 2024-03-01 12:00:03
Attributes = A

Path = docs
Folder = +
Size = 0
Modified = 2024-03-01 12:00:00
Attributes = D
";

/// `7z l -slt` output for an archive with loose top-level files
pub const LOOSE_ZIP_SLT: &str = "\
Path = /data/loose.zip
Type = zip

----------
Path = a.txt
Folder = -
Modified = 2024-03-02 08:00:00

Path = b.txt
Folder = -
Modified = 2024-03-02 08:00:01
";

/// `7z l -slt` output for the first volume of a two-volume 7z set
pub const SPLIT_7Z_SLT: &str = "\
Path = /data/movie.7z.001
Type = Split
Multivolume = +
Volume Index = 0
Volumes = 2

----------
Path = movie/movie.mkv
Folder = -
Size = 4000000

Path = movie
Folder = +
";

/// `7z l -slt` output for the same set listed through its second volume;
/// `Volumes` counts only the opened volume and those after it
pub const SPLIT_7Z_SECOND_SLT: &str = "\
Path = /data/movie.7z.002
Type = Split
Multivolume = +
Volume Index = 1
Volumes = 1

----------
Path = movie/movie.mkv
Folder = -
Size = 4000000

Path = movie
Folder = +
";

/// Entry names whose accents use decomposed code points
pub const DECOMPOSED_SLT: &str = "\
Path = /data/menu.zip
Type = zip

----------
Path = cafe\u{301}/cre\u{300}me.txt
Folder = -

Path = cafe\u{301}
Folder = +
";
